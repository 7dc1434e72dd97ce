use anyhow::{Context, anyhow, bail};
use serde::Serialize;
use std::env;
use tgeconet::export::{AdjacencyCsvDirectory, EdgeListDirectory, export_network};
use tgeconet::tgeconet_protocol::{AgeBracket, EdgeRecord, HighDegreeGene};
use tgeconet::{
    ExpressionFetcher, GeneMetadata, GtexClient, IdScheme, JsonFileFetcher, MetadataResolver,
    NetworkAnalyzer, NetworkConfig, PassthroughResolver, TemporalNetwork, Tgeconet, about,
};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct TimepointSummary {
    timepoint: usize,
    age_bracket: AgeBracket,
    nodes: usize,
    edges: Vec<EdgeRecord>,
}

#[derive(Serialize)]
struct BuildSummary {
    genes: Vec<String>,
    total_edges: usize,
    timepoints: Vec<TimepointSummary>,
}

#[derive(Serialize)]
struct TimepointTopGenes {
    timepoint: usize,
    age_bracket: AgeBracket,
    genes: Vec<HighDegreeGene>,
}

#[derive(Debug, Default, PartialEq)]
struct Inputs {
    config: String,
    metadata: Option<String>,
    table: Option<String>,
    edges: Option<String>,
    adjacency: Option<String>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  tgeconet_cli --version\n  \
  tgeconet_cli [--verbose] build CONFIG.json [OPTIONS]\n  \
  tgeconet_cli [--verbose] stats CONFIG.json [OPTIONS]\n  \
  tgeconet_cli [--verbose] top-genes N CONFIG.json [OPTIONS]\n\n  \
  Options:\n    \
    --metadata PATH    gene metadata (space separated: gene_symbol ensembl_id)\n    \
    --table PATH       saved GTEx geneExpression response instead of a live query\n    \
    --edges DIR        write one edge list per time point\n    \
    --adjacency DIR    write one adjacency CSV per time point"
    );
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_inputs(args: &[String]) -> anyhow::Result<Inputs> {
    let mut inputs = Inputs::default();
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("Missing value for {flag}"))
        };
        match arg.as_str() {
            "--metadata" => inputs.metadata = Some(value(arg)?),
            "--table" => inputs.table = Some(value(arg)?),
            "--edges" => inputs.edges = Some(value(arg)?),
            "--adjacency" => inputs.adjacency = Some(value(arg)?),
            other if other.starts_with("--") => bail!("Unknown option '{other}'"),
            other if config.is_none() => config = Some(other.to_string()),
            other => bail!("Unexpected argument '{other}'"),
        }
    }
    inputs.config = config.ok_or_else(|| anyhow!("Missing CONFIG.json"))?;
    Ok(inputs)
}

fn resolver(inputs: &Inputs, config: &NetworkConfig) -> anyhow::Result<Box<dyn MetadataResolver>> {
    match (&inputs.metadata, config.id_type) {
        (Some(path), _) => Ok(Box::new(GeneMetadata::from_csv_file(path)?)),
        (None, IdScheme::GeneCode) => Ok(Box::new(PassthroughResolver)),
        (None, IdScheme::GeneSymbol) => {
            bail!("id_type 'gene_symbol' requires --metadata to map symbols to gene codes")
        }
    }
}

fn fetcher(inputs: &Inputs, config: &NetworkConfig) -> anyhow::Result<Box<dyn ExpressionFetcher>> {
    match &inputs.table {
        Some(path) => Ok(Box::new(JsonFileFetcher::new(path))),
        None => Ok(Box::new(GtexClient::new(&config.dataset_id)?)),
    }
}

fn construct(inputs: &Inputs) -> anyhow::Result<(Tgeconet, TemporalNetwork)> {
    let config = NetworkConfig::from_json_file(&inputs.config)?;
    let resolver = resolver(inputs, &config)?;
    let fetcher = fetcher(inputs, &config)?;
    let tgeconet = Tgeconet::new(config, resolver.as_ref())?;
    let network = tgeconet.construct_temporal_network(fetcher.as_ref())?;

    if let Some(dir) = &inputs.edges {
        let mut sink = EdgeListDirectory::new(dir)?;
        export_network(&mut sink, &network)?;
        tracing::info!(files = sink.written().len(), dir = %dir, "edge lists written");
    }
    if let Some(dir) = &inputs.adjacency {
        let mut sink = AdjacencyCsvDirectory::new(dir)?;
        export_network(&mut sink, &network)?;
        tracing::info!(files = sink.written().len(), dir = %dir, "adjacency matrices written");
    }
    Ok((tgeconet, network))
}

fn summarize(tgeconet: &Tgeconet, network: &TemporalNetwork) -> BuildSummary {
    BuildSummary {
        genes: tgeconet.genes().labels(),
        total_edges: network.total_edges(),
        timepoints: network
            .iter()
            .enumerate()
            .map(|(i, graph)| TimepointSummary {
                timepoint: i + 1,
                age_bracket: graph.age_bracket(),
                nodes: graph.node_count(),
                edges: graph.edges(),
            })
            .collect(),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let args: Vec<String> = args
        .into_iter()
        .skip(1)
        .filter(|a| a != "--verbose" && a != "-v")
        .collect();
    let Some(command) = args.first() else {
        usage();
        bail!("Missing command");
    };
    init_logging(verbose);

    match command.as_str() {
        "build" => {
            let inputs = parse_inputs(&args[1..])?;
            let (tgeconet, network) = construct(&inputs)?;
            print_json(&summarize(&tgeconet, &network))
        }
        "stats" => {
            let inputs = parse_inputs(&args[1..])?;
            let (_, network) = construct(&inputs)?;
            print_json(&NetworkAnalyzer::new().analyze(&network))
        }
        "top-genes" => {
            let Some(n) = args.get(1) else {
                usage();
                bail!("top-genes requires: N CONFIG.json");
            };
            let top_n: usize = n
                .parse()
                .with_context(|| format!("Invalid number of genes '{n}'"))?;
            let inputs = parse_inputs(&args[2..])?;
            let (_, network) = construct(&inputs)?;
            let ranked: Vec<TimepointTopGenes> = NetworkAnalyzer::new()
                .high_degree_genes(&network, top_n)
                .into_iter()
                .zip(network.iter())
                .enumerate()
                .map(|(i, (genes, graph))| TimepointTopGenes {
                    timepoint: i + 1,
                    age_bracket: graph.age_bracket(),
                    genes,
                })
                .collect();
            print_json(&ranked)
        }
        other => {
            usage();
            bail!("Unknown command '{other}'")
        }
    }
}
