//! Inflation adjustment.
//!
//! A dollar amount annotated with a parenthesized year, `$100 (1975)`,
//! gains a present-day equivalent: `$100 (1975; ≈$566 in 2023)`. Amounts
//! with no year, or years outside the table, are left alone.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::ast::{Doc, Inline};

/// Annual CPI-U averages, 1913 through the reference year. Ratios of these
/// are what matter; sub-point accuracy is noise at popup precision.
const CPI: &[(i32, f64)] = &[
    (1913, 9.9), (1914, 10.0), (1915, 10.1), (1916, 10.9), (1917, 12.8), (1918, 15.1),
    (1919, 17.3), (1920, 20.0), (1921, 17.9), (1922, 16.8), (1923, 17.1), (1924, 17.1),
    (1925, 17.5), (1926, 17.7), (1927, 17.4), (1928, 17.1), (1929, 17.1), (1930, 16.7),
    (1931, 15.2), (1932, 13.7), (1933, 13.0), (1934, 13.4), (1935, 13.7), (1936, 13.9),
    (1937, 14.4), (1938, 14.1), (1939, 13.9), (1940, 14.0), (1941, 14.7), (1942, 16.3),
    (1943, 17.3), (1944, 17.6), (1945, 18.0), (1946, 19.5), (1947, 22.3), (1948, 24.1),
    (1949, 23.8), (1950, 24.1), (1951, 26.0), (1952, 26.5), (1953, 26.7), (1954, 26.9),
    (1955, 26.8), (1956, 27.2), (1957, 28.1), (1958, 28.9), (1959, 29.1), (1960, 29.6),
    (1961, 29.9), (1962, 30.2), (1963, 30.6), (1964, 31.0), (1965, 31.5), (1966, 32.4),
    (1967, 33.4), (1968, 34.8), (1969, 36.7), (1970, 38.8), (1971, 40.5), (1972, 41.8),
    (1973, 44.4), (1974, 49.3), (1975, 53.8), (1976, 56.9), (1977, 60.6), (1978, 65.2),
    (1979, 72.6), (1980, 82.4), (1981, 90.9), (1982, 96.5), (1983, 99.6), (1984, 103.9),
    (1985, 107.6), (1986, 109.6), (1987, 113.6), (1988, 118.3), (1989, 124.0),
    (1990, 130.7), (1991, 136.2), (1992, 140.3), (1993, 144.5), (1994, 148.2),
    (1995, 152.4), (1996, 156.9), (1997, 160.5), (1998, 163.0), (1999, 166.6),
    (2000, 172.2), (2001, 177.1), (2002, 179.9), (2003, 184.0), (2004, 188.9),
    (2005, 195.3), (2006, 201.6), (2007, 207.3), (2008, 215.3), (2009, 214.5),
    (2010, 218.1), (2011, 224.9), (2012, 229.6), (2013, 233.0), (2014, 236.7),
    (2015, 237.0), (2016, 240.0), (2017, 245.1), (2018, 251.1), (2019, 255.7),
    (2020, 258.8), (2021, 271.0), (2022, 292.7), (2023, 304.7),
];

pub const REFERENCE_YEAR: i32 = 2023;

static AMOUNT_WITH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([0-9][0-9,]*(?:\.[0-9]+)?) \(([0-9]{4})\)").expect("static pattern")
});

fn cpi_for(year: i32) -> Option<f64> {
    CPI.iter().find(|(y, _)| *y == year).map(|(_, v)| *v)
}

pub fn run(doc: &mut Doc) {
    doc.walk_inlines_mut(&mut |inline| {
        if let Inline::Str(text) = inline
            && text.contains('$')
        {
            *text = adjust_text(text);
        }
    });
}

pub fn adjust_text(text: &str) -> String {
    AMOUNT_WITH_YEAR
        .replace_all(text, |caps: &Captures<'_>| {
            let raw_amount = &caps[1];
            let year: i32 = caps[2].parse().unwrap_or(0);
            let amount: f64 = match raw_amount.replace(',', "").parse() {
                Ok(a) => a,
                Err(_) => return caps[0].to_string(),
            };
            let (Some(then), Some(now)) = (cpi_for(year), cpi_for(REFERENCE_YEAR)) else {
                return caps[0].to_string();
            };
            let adjusted = amount * now / then;
            format!(
                "${raw_amount} ({year}; \u{2248}${} in {REFERENCE_YEAR})",
                format_amount(adjusted)
            )
        })
        .into_owned()
}

/// Popup precision: whole dollars with separators above ten, cents below.
fn format_amount(value: f64) -> String {
    if value >= 10.0 {
        group_thousands(value.round() as i64)
    } else {
        format!("{value:.2}")
    }
}

fn group_thousands(mut value: i64) -> String {
    let negative = value < 0;
    value = value.abs();
    let mut groups: Vec<String> = Vec::new();
    loop {
        if value < 1000 {
            groups.push(value.to_string());
            break;
        }
        groups.push(format!("{:03}", value % 1000));
        value /= 1000;
    }
    groups.reverse();
    let joined = groups.join(",");
    if negative { format!("-{joined}") } else { joined }
}

#[cfg(test)]
mod tests;
