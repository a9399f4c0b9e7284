//! Mat number lists such as `1-12,15,20-24`.
//!
//! Templates describe the mats of a facility with these lists. Parsing
//! normalizes the list into an ascending, de-duplicated set, and `Display`
//! renders it back in compressed range form. A list holds at most
//! [`MAX_MATS`] mats.

use std::{collections::BTreeSet, fmt, str::FromStr};

use thiserror::Error;

pub const MAX_MATS: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatsListError {
    #[error("Mat number '{0}' is not a positive integer")]
    InvalidNumber(String),
    #[error("Mat range '{0}' has its start greater than its end")]
    DescendingRange(String),
    #[error("Mat range '{0}' is malformed")]
    MalformedRange(String),
    #[error("A mats list may hold at most {MAX_MATS} mats")]
    TooMany,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatsList {
    mats: BTreeSet<i32>,
}

impl MatsList {
    pub fn contains(&self, mat: i32) -> bool {
        self.mats.contains(&mat)
    }

    pub fn len(&self) -> usize {
        self.mats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.mats.iter().copied()
    }

    pub fn is_subset_of(&self, other: &MatsList) -> bool {
        self.mats.is_subset(&other.mats)
    }
}

fn parse_mat(raw: &str, item: &str) -> Result<i32, MatsListError> {
    match raw.trim().parse::<i32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(MatsListError::InvalidNumber(item.trim().to_string())),
    }
}

impl FromStr for MatsList {
    type Err = MatsListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mats = BTreeSet::new();
        for item in s.split(',') {
            let item = item.trim();
            if item.is_empty() {
                if s.trim().is_empty() {
                    continue;
                }
                return Err(MatsListError::MalformedRange(s.trim().to_string()));
            }
            match item.split_once('-') {
                None => {
                    mats.insert(parse_mat(item, item)?);
                }
                Some((from, to)) => {
                    if from.trim().is_empty() || to.trim().is_empty() || to.contains('-') {
                        return Err(MatsListError::MalformedRange(item.to_string()));
                    }
                    let from = parse_mat(from, item)?;
                    let to = parse_mat(to, item)?;
                    if from > to {
                        return Err(MatsListError::DescendingRange(item.to_string()));
                    }
                    // 展開前に範囲の大きさを確認する
                    if (to - from) as usize >= MAX_MATS {
                        return Err(MatsListError::TooMany);
                    }
                    mats.extend(from..=to);
                }
            }
            if mats.len() > MAX_MATS {
                return Err(MatsListError::TooMany);
            }
        }
        Ok(Self { mats })
    }
}

impl fmt::Display for MatsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ranges: Vec<(i32, i32)> = Vec::new();
        for mat in self.iter() {
            match ranges.last_mut() {
                Some((_, end)) if *end + 1 == mat => *end = mat,
                _ => ranges.push((mat, mat)),
            }
        }
        let rendered: Vec<String> = ranges
            .into_iter()
            .map(|(start, end)| {
                if start == end {
                    start.to_string()
                } else {
                    format!("{start}-{end}")
                }
            })
            .collect();
        f.write_str(&rendered.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singles_and_ranges() {
        let mats: MatsList = "1-3, 5 ,8-9".parse().unwrap();
        assert_eq!(mats.iter().collect::<Vec<_>>(), vec![1, 2, 3, 5, 8, 9]);
        assert_eq!(mats.len(), 6);
        assert!(mats.contains(5));
        assert!(!mats.contains(4));
    }

    #[test]
    fn empty_string_is_empty_list() {
        let mats: MatsList = "".parse().unwrap();
        assert!(mats.is_empty());
        assert_eq!(mats.to_string(), "");
    }

    #[test]
    fn display_compresses_and_deduplicates() {
        let mats: MatsList = "5,1,2,3,3,4,7,9-10".parse().unwrap();
        assert_eq!(mats.to_string(), "1-5,7,9-10");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            "0".parse::<MatsList>(),
            Err(MatsListError::InvalidNumber("0".into()))
        );
        assert_eq!(
            "5-2".parse::<MatsList>(),
            Err(MatsListError::DescendingRange("5-2".into()))
        );
        assert_eq!(
            "1-2-3".parse::<MatsList>(),
            Err(MatsListError::MalformedRange("1-2-3".into()))
        );
        assert!("1,,2".parse::<MatsList>().is_err());
        assert!("a".parse::<MatsList>().is_err());
        assert!("-3".parse::<MatsList>().is_err());
    }

    #[test]
    fn caps_the_number_of_mats() {
        let full = format!("1-{MAX_MATS}");
        assert_eq!(full.parse::<MatsList>().map(|m| m.len()), Ok(MAX_MATS));
        assert_eq!(
            "1-2000000000".parse::<MatsList>(),
            Err(MatsListError::TooMany)
        );
        let spread = format!("1-{MAX_MATS},{}", MAX_MATS + 5);
        assert_eq!(spread.parse::<MatsList>(), Err(MatsListError::TooMany));
        let overlapping = format!("1-{MAX_MATS},1-{MAX_MATS}");
        assert!(overlapping.parse::<MatsList>().is_ok());
    }

    #[test]
    fn subset_checks() {
        let all: MatsList = "1-10".parse().unwrap();
        let handicap: MatsList = "2,4".parse().unwrap();
        let outside: MatsList = "9-11".parse().unwrap();
        assert!(handicap.is_subset_of(&all));
        assert!(!outside.is_subset_of(&all));
        assert!(MatsList::default().is_subset_of(&all));
    }
}
