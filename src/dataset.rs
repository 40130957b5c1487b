use indexmap::IndexSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{KMeansError, Result};
use crate::point::Point;

/// Labeled vectors read from an ARFF or plain comma separated file.
///
/// The last column of every row is the class label, the rest are features.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub points: Vec<Point>,
    pub labels: IndexSet<String>,
}

impl Dataset {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let fh = File::open(path)?;
        Self::parse(BufReader::new(fh))
    }

    pub fn parse<B: BufRead>(reader: B) -> Result<Self> {
        let mut dataset = Dataset::default();
        // values of the most recent nominal @attribute, the class if it is last
        let mut nominal: Option<Vec<String>> = None;
        let mut in_header = false;
        let mut in_data = false;
        let mut dim: Option<usize> = None;

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            let lineno = lineno + 1;
            if line.is_empty() || line.starts_with('%') {
                continue;
            }

            if line.starts_with('@') {
                in_header = true;
                let lower = line.to_ascii_lowercase();
                if lower.starts_with("@attribute") {
                    nominal = parse_nominal(line);
                } else if lower.starts_with("@data") {
                    in_data = true;
                    if let Some(values) = nominal.take() {
                        dataset.labels.extend(values);
                    }
                }
                continue;
            }
            if in_header && !in_data {
                return Err(KMeansError::Parse {
                    line: lineno,
                    msg: "data row before @data".to_string(),
                });
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let Some((label, features)) = fields.split_last() else {
                continue;
            };
            if features.is_empty() {
                return Err(KMeansError::Parse {
                    line: lineno,
                    msg: "expected at least one feature before the class".to_string(),
                });
            }

            let mut data = Vec::with_capacity(features.len());
            for field in features {
                let value = field.parse::<f64>().map_err(|e| KMeansError::Parse {
                    line: lineno,
                    msg: format!("'{}': {}", field, e),
                })?;
                data.push(value);
            }

            match dim {
                None => dim = Some(data.len()),
                Some(d) if d != data.len() => {
                    return Err(KMeansError::DimensionMismatch {
                        expected: d,
                        found: data.len(),
                    })
                }
                Some(_) => {}
            }

            let label = unquote(label);
            let classifier = if label == "?" {
                None
            } else {
                Some(dataset.labels.insert_full(label.to_string()).0)
            };
            dataset.points.push(Point { data, classifier });
        }

        debug!(
            "read {} points with {} classes",
            dataset.points.len(),
            dataset.labels.len()
        );
        Ok(dataset)
    }

    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    pub fn dim(&self) -> usize {
        self.points.first().map_or(0, Point::dim)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// `@attribute class {a, b, 'c d'}` -> `["a", "b", "c d"]`
fn parse_nominal(line: &str) -> Option<Vec<String>> {
    let open = line.find('{')?;
    let close = line.rfind('}')?;
    if close <= open {
        return None;
    }
    Some(
        line[open + 1..close]
            .split(',')
            .map(|v| unquote(v.trim()).to_string())
            .filter(|v| !v.is_empty())
            .collect(),
    )
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}
