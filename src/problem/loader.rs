//! Plain-text problem files.
//!
//! A file is a sequence of whitespace-separated numeric blocks, each ended by
//! a blank line (or the end of the file):
//!
//! ```text
//! degree total_time flag_bits
//!
//! start (one value per line)
//!
//! end (one value per line)
//!
//! split times (one per line, empty block when the curve is not split)
//!
//! inequality matrix of segment 0
//!
//! inequality vector of segment 0
//!
//! ... one matrix and one vector per segment
//! ```
//!
//! An empty block is a single blank line. Curve derivative constraints are
//! not stored and load as zeros.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::Path;

use nalgebra::{DMatrix, DVector, SVector};
use tracing::debug;

use super::definition::ProblemDefinition;
use super::flags::BoundaryFlags;
use crate::error::{OptError, Result};

/// Load a problem definition from a file.
pub fn load_problem<const D: usize>(path: impl AsRef<Path>) -> Result<ProblemDefinition<f64, D>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| OptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let def = parse_problem(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        degree = def.degree(),
        segments = def.num_segments(),
        "loaded problem file"
    );
    Ok(def)
}

/// Parse a problem definition from any buffered reader.
pub fn parse_problem<const D: usize, R: BufRead>(reader: R) -> Result<ProblemDefinition<f64, D>> {
    let mut blocks = BlockReader::new(reader);

    let header = blocks.next_block(false)?;
    let (degree, total_time, bits) = match header.values.as_slice() {
        [degree, time, bits] => (*degree, *time, *bits),
        _ => {
            return Err(header.error(format!(
                "header needs degree, total time and flags, got {} values",
                header.values.len()
            )))
        }
    };
    let degree = integral(degree).ok_or_else(|| header.error("degree must be a non-negative integer"))?;
    let bits = integral(bits)
        .and_then(|b| u32::try_from(b).ok())
        .ok_or_else(|| header.error("flags must be a non-negative integer"))?;

    let mut def = ProblemDefinition::<f64, D>::new(degree, total_time)
        .with_flags(BoundaryFlags::from_bits(bits)?)
        .with_start(blocks.next_block(false)?.point()?)
        .with_end(blocks.next_block(false)?.point()?);

    let splits = blocks.next_block(true)?;
    let split_times = splits.column()?.iter().copied().collect();
    def.set_split_times(split_times)?;

    for _ in 0..def.num_segments() {
        let matrix = blocks.next_block(false)?.matrix();
        let vector = blocks.next_block(false)?.column()?;
        def.add_inequality(matrix, vector)?;
    }
    Ok(def)
}

/// Write a problem definition in the format read by `parse_problem`.
pub fn write_problem<const D: usize, W: Write>(
    def: &ProblemDefinition<f64, D>,
    mut writer: W,
) -> Result<()> {
    writeln!(writer, "{} {} {}", def.degree(), def.total_time(), def.flags().bits())?;
    writeln!(writer)?;
    write_column(&mut writer, def.start().iter())?;
    write_column(&mut writer, def.end().iter())?;
    write_column(&mut writer, def.split_times().iter())?;
    for ineq in def.inequalities() {
        for row in ineq.matrix().row_iter() {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(writer, "{}", line.join(" "))?;
        }
        writeln!(writer)?;
        write_column(&mut writer, ineq.vector().iter())?;
    }
    writer.flush()?;
    Ok(())
}

fn write_column<'a, W: Write>(writer: &mut W, values: impl Iterator<Item = &'a f64>) -> Result<()> {
    for v in values {
        writeln!(writer, "{}", v)?;
    }
    writeln!(writer)?;
    Ok(())
}

fn integral(value: f64) -> Option<usize> {
    (value >= 0.0 && value.fract() == 0.0 && value < usize::MAX as f64).then_some(value as usize)
}

/// A parsed block: row-major values and the line it started on.
struct Block {
    line: usize,
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Block {
    fn error(&self, message: impl Into<String>) -> OptError {
        OptError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.rows, self.cols, &self.values)
    }

    /// A column vector, written one value per line.
    fn column(&self) -> Result<DVector<f64>> {
        if self.rows > 0 && self.cols != 1 {
            return Err(self.error(format!("expected a column vector, got {} columns", self.cols)));
        }
        Ok(DVector::from_column_slice(&self.values))
    }

    fn point<const D: usize>(&self) -> Result<SVector<f64, D>> {
        let column = self.column()?;
        if column.len() != D {
            return Err(OptError::shape(
                format!("point with {} coordinates", D),
                format!("{} coordinates (line {})", column.len(), self.line),
            ));
        }
        Ok(SVector::from_column_slice(column.as_slice()))
    }
}

struct BlockReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> BlockReader<R> {
    fn new(reader: R) -> Self {
        BlockReader {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => {
                self.line += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    /// Read rows up to the next blank line.
    ///
    /// Leading blank lines are skipped unless `allow_empty` is set, in which
    /// case a blank line right away yields an empty block.
    fn next_block(&mut self, allow_empty: bool) -> Result<Block> {
        let mut block = Block {
            line: self.line + 1,
            rows: 0,
            cols: 0,
            values: Vec::new(),
        };
        while let Some(text) = self.next_line()? {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.is_empty() {
                if block.rows > 0 || allow_empty {
                    return Ok(block);
                }
                block.line = self.line + 1;
                continue;
            }
            if block.rows == 0 {
                block.cols = tokens.len();
            } else if tokens.len() != block.cols {
                return Err(OptError::Parse {
                    line: self.line,
                    message: format!("expected {} values, got {}", block.cols, tokens.len()),
                });
            }
            for token in tokens {
                let value = token.parse::<f64>().map_err(|e| OptError::Parse {
                    line: self.line,
                    message: format!("invalid number {:?}: {}", token, e),
                })?;
                block.values.push(value);
            }
            block.rows += 1;
        }
        if block.rows == 0 && !allow_empty {
            return Err(OptError::Parse {
                line: self.line,
                message: "unexpected end of file".into(),
            });
        }
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use std::io::Cursor;

    const TWO_SEGMENTS: &str = "\
5 2 3

0
0
0

1
0
0

1.0

1 0 0
-1 0 0

2
0

0 1 0

4
";

    #[test]
    fn test_parse_two_segments() {
        let def = parse_problem::<3, _>(Cursor::new(TWO_SEGMENTS)).unwrap();
        assert_eq!(def.degree(), 5);
        assert_eq!(def.total_time(), 2.0);
        assert_eq!(def.flags(), BoundaryFlags::INIT_POS | BoundaryFlags::INIT_VEL);
        assert_eq!(def.end(), &Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(def.split_times(), &[1.0]);
        assert_eq!(def.inequalities().len(), 2);
        assert_eq!(def.inequality(0).unwrap().rows(), 2);
        assert_eq!(def.inequality(1).unwrap().vector()[0], 4.0);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_empty_split_block() {
        let text = "3 1 256\n\n0\n0\n\n1\n1\n\n\n1 1\n\n2\n";
        let def = parse_problem::<2, _>(Cursor::new(text)).unwrap();
        assert!(def.split_times().is_empty());
        assert!(def.flags().is_empty());
        assert_eq!(def.inequalities().len(), 1);
    }

    #[test]
    fn test_ragged_row_reports_line() {
        let text = "3 1 256\n\n0\n0\n\n1\n1\n\n\n1 1\n1\n\n2\n";
        let err = parse_problem::<2, _>(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, OptError::Parse { line: 11, .. }));
    }

    #[test]
    fn test_bad_token() {
        let err = parse_problem::<2, _>(Cursor::new("3 one 256\n")).unwrap_err();
        assert!(matches!(err, OptError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_truncated_file() {
        let err = parse_problem::<2, _>(Cursor::new("3 1 256\n\n0\n0\n")).unwrap_err();
        assert!(matches!(err, OptError::Parse { .. }));
    }

    #[test]
    fn test_write_then_parse() {
        let def = parse_problem::<3, _>(Cursor::new(TWO_SEGMENTS)).unwrap();
        let mut out = Vec::new();
        write_problem(&def, &mut out).unwrap();
        let again = parse_problem::<3, _>(Cursor::new(out)).unwrap();
        assert_eq!(again, def);
    }

    #[test]
    fn test_missing_file() {
        let err = load_problem::<3>("does/not/exist.txt").unwrap_err();
        assert!(matches!(err, OptError::Io { .. }));
    }
}
