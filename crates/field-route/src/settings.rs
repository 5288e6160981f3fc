use clap::{Parser, ValueEnum};
use field_route_lib::{Config, DistanceMetric};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Field Route - Shortest routes between two points inside a polygonal field with holes
pub struct Settings {
    /// JSON request file (reads standard input when omitted)
    #[clap(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Distance used to weight graph edges
    #[clap(short, long, value_enum, default_value = "haversine")]
    pub metric: Metric,

    /// Maximum fixed-point passes per (sub-)query before giving up
    #[clap(long, default_value = "64")]
    pub max_passes: usize,

    /// Maximum nesting depth of pocket sub-queries around concave obstacles
    #[clap(long, default_value = "16")]
    pub max_depth: usize,

    /// Pretty-print the JSON response
    #[clap(long, default_value = "false")]
    pub pretty: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Great-circle kilometers over (longitude, latitude) degrees
    Haversine,
    /// Planar distance in coordinate units
    Euclidean,
}

impl From<Metric> for DistanceMetric {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Haversine => DistanceMetric::Haversine,
            Metric::Euclidean => DistanceMetric::Euclidean,
        }
    }
}

impl Settings {
    /// Route query configuration selected on the command line
    pub fn config(&self) -> Config {
        Config {
            max_passes: self.max_passes,
            max_depth: self.max_depth,
            metric: self.metric.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_library_config() {
        let settings = Settings::try_parse_from(["field-route"]).unwrap();
        assert_eq!(settings.input, None);
        assert!(!settings.pretty);
        assert_eq!(settings.config(), Config::default());
    }

    #[test]
    fn test_flags_are_applied() {
        let settings = Settings::try_parse_from([
            "field-route",
            "--input",
            "field.json",
            "--metric",
            "euclidean",
            "--max-passes",
            "8",
            "--max-depth",
            "2",
            "--pretty",
        ])
        .unwrap();

        assert_eq!(settings.input, Some(PathBuf::from("field.json")));
        assert!(settings.pretty);
        let config = settings.config();
        assert_eq!(config.max_passes, 8);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.metric, DistanceMetric::Euclidean);
    }

    #[test]
    fn test_unknown_metric_is_rejected() {
        assert!(Settings::try_parse_from(["field-route", "--metric", "manhattan"]).is_err());
    }
}
