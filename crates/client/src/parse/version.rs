//! Version string ordering.
//!
//! Versions are dot-separated numeric segments (`24.1.15`, `1.2`), optionally
//! prefixed with `v` and suffixed with `-<pre-release>`. Missing segments count
//! as zero, and a pre-release sorts before the same version without one.

use std::cmp::Ordering;

struct Version<'a> {
    release: Vec<u64>,
    pre: Option<&'a str>,
}

impl<'a> Version<'a> {
    fn parse(input: &'a str) -> Self {
        let input = input.trim();
        let input = input.strip_prefix(['v', 'V']).unwrap_or(input);
        let (release, pre) = match input.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (input, None),
        };

        let release = release.split('.').map(leading_number).collect();
        Self { release, pre }
    }
}

fn leading_number(segment: &str) -> u64 {
    let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| a.get(i).copied().unwrap_or(0).cmp(&b.get(i).copied().unwrap_or(0)))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_pre(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let mut left = a.split('.');
            let mut right = b.split('.');
            loop {
                match (left.next(), right.next()) {
                    (None, None) => return Ordering::Equal,
                    (None, Some(_)) => return Ordering::Less,
                    (Some(_), None) => return Ordering::Greater,
                    (Some(x), Some(y)) => {
                        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                            (Ok(x), Ok(y)) => x.cmp(&y),
                            (Ok(_), Err(_)) => Ordering::Less,
                            (Err(_), Ok(_)) => Ordering::Greater,
                            (Err(_), Err(_)) => x.cmp(y),
                        };
                        if ord.is_ne() {
                            return ord;
                        }
                    }
                }
            }
        }
    }
}

/// Order two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = Version::parse(a);
    let b = Version::parse(b);
    compare_release(&a.release, &b.release).then_with(|| compare_pre(a.pre, b.pre))
}
