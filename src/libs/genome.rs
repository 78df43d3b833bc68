//! Block orders of extant genomes.
//!
//! A genome file lists, per species, a `>name count` header followed by `count`
//! chromosome lines of signed block IDs terminated by `$`. Each chromosome line
//! may be preceded by a comment: `# chr<label>` marks a real chromosome, any
//! other comment a scaffold.
//!
//! ```text
//! >hg19 2
//! # chr1
//! 1 -3 2 $
//! # chr2
//! 4 5 $
//! ```
//!
//! A join file lists observed adjacencies of a fragmented outgroup assembly,
//! one `x y` pair per line, with `0` standing for a chromosome end.

use crate::libs::error::InputError;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::io::BufRead;

lazy_static! {
    static ref RE_HEADER: Regex = Regex::new(r"^>\s*(\S+)\s+(\d+)\s*$").unwrap();
    static ref RE_CHR: Regex = Regex::new(r"^#\s*chr(\S+)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromKind {
    Chromosome,
    Scaffold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    pub label: Option<String>,
    pub kind: ChromKind,
    /// Signed block IDs; the sign is the orientation
    pub blocks: Vec<i32>,
}

impl Chromosome {
    pub fn new(blocks: Vec<i32>) -> Self {
        Self {
            label: None,
            kind: ChromKind::Chromosome,
            blocks,
        }
    }
}

/// Parse one chromosome line: signed block IDs up to the `$` terminator.
///
/// ```
/// use deschrambler::libs::genome::parse_blocks;
///
/// assert_eq!(parse_blocks("1 -3 2 $").unwrap(), vec![1, -3, 2]);
/// assert!(parse_blocks("$").is_err());
/// assert!(parse_blocks("1 x $").is_err());
/// ```
pub fn parse_blocks(line: &str) -> Result<Vec<i32>, InputError> {
    let mut blocks = Vec::new();
    for token in line.split_whitespace() {
        if token == "$" {
            break;
        }
        let id: i32 = token
            .parse()
            .map_err(|_| InputError::Format(format!("bad block ID '{}' in: {}", token, line)))?;
        if id == 0 {
            return Err(InputError::Format(format!("block ID 0 in: {}", line)));
        }
        blocks.push(id);
    }

    if blocks.is_empty() {
        return Err(InputError::Format(format!(
            "chromosome without blocks: '{}'",
            line
        )));
    }

    Ok(blocks)
}

/// Read every genome of a genome file, in file order.
pub fn read_genomes<R: BufRead>(reader: R) -> Result<IndexMap<String, Vec<Chromosome>>, InputError> {
    let mut genomes: IndexMap<String, Vec<Chromosome>> = IndexMap::new();

    let mut lines = reader
        .lines()
        .map(|l| l.map_err(|e| InputError::Format(e.to_string())))
        .filter(|l| l.as_ref().map(|s| !s.trim().is_empty()).unwrap_or(true));

    while let Some(line) = lines.next() {
        let line = line?;
        let line = line.trim();
        if !line.starts_with('>') {
            // stray comments between genomes are tolerated
            if line.starts_with('#') {
                continue;
            }
            return Err(InputError::Format(format!(
                "expected a '>name count' header, got: {}",
                line
            )));
        }

        let caps = RE_HEADER
            .captures(line)
            .ok_or_else(|| InputError::Format(format!("cannot parse header: {}", line)))?;
        let name = caps[1].to_string();
        let count: usize = caps[2]
            .parse()
            .map_err(|_| InputError::Format(format!("cannot parse header: {}", line)))?;

        let mut chroms = Vec::with_capacity(count);
        for _ in 0..count {
            let mut current = next_line(&mut lines, &name)?;
            let mut label = None;
            let mut kind = ChromKind::Chromosome;
            if current.starts_with('#') {
                match RE_CHR.captures(&current) {
                    Some(c) => label = Some(c[1].to_string()),
                    None => {
                        kind = ChromKind::Scaffold;
                        let rest = current.trim_start_matches('#').trim();
                        if !rest.is_empty() {
                            label = Some(rest.to_string());
                        }
                    }
                }
                current = next_line(&mut lines, &name)?;
            }
            chroms.push(Chromosome {
                label,
                kind,
                blocks: parse_blocks(&current)?,
            });
        }

        if genomes.contains_key(&name) {
            return Err(InputError::Consistency(format!(
                "genome {} listed twice",
                name
            )));
        }
        genomes.insert(name, chroms);
    }

    Ok(genomes)
}

fn next_line<I>(lines: &mut I, name: &str) -> Result<String, InputError>
where
    I: Iterator<Item = Result<String, InputError>>,
{
    match lines.next() {
        Some(line) => Ok(line?.trim().to_string()),
        None => Err(InputError::Format(format!(
            "genome {} ends before all its chromosomes",
            name
        ))),
    }
}

/// Read the adjacency pairs of a join file. `0` marks a chromosome end.
pub fn read_joins<R: BufRead>(reader: R) -> Result<Vec<(i32, i32)>, InputError> {
    let mut joins = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| InputError::Format(e.to_string()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(InputError::Format(format!("bad join line: {}", line)));
        }
        let parse = |s: &str| {
            s.parse::<i32>()
                .map_err(|_| InputError::Format(format!("bad join line: {}", line)))
        };
        joins.push((parse(fields[0])?, parse(fields[1])?));
    }

    Ok(joins)
}
