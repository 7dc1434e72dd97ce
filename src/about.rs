pub const TGECONET_DISPLAY_VERSION: &str = env!("TGECONET_DISPLAY_VERSION");
pub const TGECONET_BUILD_N: &str = env!("TGECONET_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "tgeconet {}\nBuild {}\nTemporal gene co-expression networks from GTEx age brackets",
        TGECONET_DISPLAY_VERSION, TGECONET_BUILD_N
    )
}
