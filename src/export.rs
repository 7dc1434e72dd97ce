//! File sinks for timepoint graphs.

use crate::analysis::NetworkAnalyzer;
use crate::error::Result;
use crate::graph::TimepointGraph;
use crate::network::TemporalNetwork;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub trait GraphExportSink {
    fn export(&mut self, label: &str, graph: &TimepointGraph) -> Result<()>;
}

/// Exports every timepoint as `timepoint1`, `timepoint2`, ...
pub fn export_network(sink: &mut dyn GraphExportSink, network: &TemporalNetwork) -> Result<()> {
    for (i, graph) in network.iter().enumerate() {
        sink.export(&format!("timepoint{}", i + 1), graph)?;
    }
    Ok(())
}

/// One `<label>.txt` edge list per graph, `u v {'pvalue': p}` per line.
#[derive(Debug, Clone)]
pub struct EdgeListDirectory {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl EdgeListDirectory {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            written: vec![],
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl GraphExportSink for EdgeListDirectory {
    fn export(&mut self, label: &str, graph: &TimepointGraph) -> Result<()> {
        let path = self.dir.join(format!("{label}.txt"));
        let mut out = BufWriter::new(File::create(&path)?);
        for edge in graph.edges() {
            writeln!(out, "{} {} {{'pvalue': {}}}", edge.source, edge.target, edge.pvalue)?;
        }
        out.flush()?;
        self.written.push(path);
        Ok(())
    }
}

/// One `<label>_adjacency.csv` matrix per graph with gene headers.
#[derive(Debug, Clone)]
pub struct AdjacencyCsvDirectory {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl AdjacencyCsvDirectory {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            written: vec![],
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl GraphExportSink for AdjacencyCsvDirectory {
    fn export(&mut self, label: &str, graph: &TimepointGraph) -> Result<()> {
        let matrix = NetworkAnalyzer::adjacency_matrix(graph);
        let path = self.dir.join(format!("{label}_adjacency.csv"));
        let mut wtr = csv::Writer::from_path(&path)?;
        let mut header = vec![String::new()];
        header.extend(matrix.genes.iter().cloned());
        wtr.write_record(&header)?;
        for (gene, row) in matrix.genes.iter().zip(&matrix.values) {
            let mut record = vec![gene.clone()];
            record.extend(row.iter().map(|v| v.to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        self.written.push(path);
        Ok(())
    }
}
