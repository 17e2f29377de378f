//! Calldata shaping for contract entry points.
//!
//! Parameters arrive as possibly-nested sequences (array arguments nest); the
//! wire wants a flat felt vector with Cairo's length-prefix convention for
//! every nested array.

use crate::parsers::{parse_felt, FeltParseError};
use starknet_types_core::felt::Felt;

/// A possibly-nested entry point parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param<T> {
    Scalar(T),
    List(Vec<Param<T>>),
}

impl<T> Param<T> {
    pub fn list(items: impl IntoIterator<Item = T>) -> Self {
        Param::List(items.into_iter().map(Param::Scalar).collect())
    }
}

/// Converts every scalar leaf to its string form, preserving nesting.
pub fn stringify<T: ToString>(params: Vec<Param<T>>) -> Vec<Param<String>> {
    params
        .into_iter()
        .map(|param| match param {
            Param::Scalar(value) => Param::Scalar(value.to_string()),
            Param::List(inner) => Param::List(stringify(inner)),
        })
        .collect()
}

/// String-encodes parameters for submission. Strings pass through untouched.
pub fn prepare_params<T: ToString>(params: Vec<Param<T>>) -> Vec<Param<String>> {
    stringify(params)
}

/// Flattens string-encoded parameters into felt calldata. Each nested list is
/// prefixed with its length, recursively.
pub fn flatten_to_felts(params: &[Param<String>]) -> Result<Vec<Felt>, FeltParseError> {
    let mut calldata = Vec::with_capacity(params.len());
    for param in params {
        match param {
            Param::Scalar(value) => calldata.push(parse_felt(value)?),
            Param::List(inner) => {
                calldata.push(Felt::from(inner.len() as u64));
                calldata.extend(flatten_to_felts(inner)?);
            }
        }
    }
    Ok(calldata)
}

/// Parses flat CLI-provided parameters into felt calldata.
pub fn calldata_from_cli(params: &[String]) -> Result<Vec<Felt>, FeltParseError> {
    params.iter().map(|p| parse_felt(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scalars(values: &[u64]) -> Vec<Param<u64>> {
        values.iter().map(|v| Param::Scalar(*v)).collect()
    }

    fn strings(values: &[&str]) -> Vec<Param<String>> {
        values.iter().map(|v| Param::Scalar(v.to_string())).collect()
    }

    #[test]
    fn stringify_empty_is_empty() {
        assert_eq!(stringify(Vec::<Param<u64>>::new()), vec![]);
    }

    #[test]
    fn stringify_converts_leaves_one_level() {
        let input = vec![Param::List(scalars(&[1, 2, 3]))];
        assert_eq!(stringify(input), vec![Param::List(strings(&["1", "2", "3"]))]);
    }

    #[test]
    fn stringify_preserves_two_levels() {
        let input = vec![Param::List(vec![
            Param::Scalar(1),
            Param::Scalar(2),
            Param::Scalar(3),
            Param::List(scalars(&[4, 5, 6])),
        ])];
        let expected = vec![Param::List(vec![
            Param::Scalar("1".to_string()),
            Param::Scalar("2".to_string()),
            Param::Scalar("3".to_string()),
            Param::List(strings(&["4", "5", "6"])),
        ])];
        assert_eq!(stringify(input), expected);
    }

    #[test]
    fn stringify_preserves_three_levels() {
        let input = vec![Param::List(vec![
            Param::Scalar(1),
            Param::Scalar(2),
            Param::Scalar(3),
            Param::List(vec![
                Param::Scalar(4),
                Param::Scalar(5),
                Param::Scalar(6),
                Param::List(scalars(&[7, 8, 9])),
            ]),
        ])];
        let expected = vec![Param::List(vec![
            Param::Scalar("1".to_string()),
            Param::Scalar("2".to_string()),
            Param::Scalar("3".to_string()),
            Param::List(vec![
                Param::Scalar("4".to_string()),
                Param::Scalar("5".to_string()),
                Param::Scalar("6".to_string()),
                Param::List(strings(&["7", "8", "9"])),
            ]),
        ])];
        assert_eq!(stringify(input), expected);
    }

    #[test]
    fn prepare_params_matches_stringify() {
        let input = vec![Param::List(scalars(&[1, 2, 3]))];
        assert_eq!(prepare_params(input.clone()), stringify(input));
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&["1", "0x2"], &[1, 2])]
    fn flatten_scalars(#[case] input: &[&str], #[case] expected: &[u64]) {
        let params = strings(input);
        let expected: Vec<Felt> = expected.iter().map(|v| Felt::from(*v)).collect();
        assert_eq!(flatten_to_felts(&params).unwrap(), expected);
    }

    #[test]
    fn flatten_prefixes_nested_lists_with_length() {
        let params = vec![Param::Scalar("7".to_string()), Param::List(strings(&["1", "2", "3"]))];
        let expected: Vec<Felt> = [7u64, 3, 1, 2, 3].iter().map(|v| Felt::from(*v)).collect();
        assert_eq!(flatten_to_felts(&params).unwrap(), expected);
    }

    #[test]
    fn flatten_rejects_non_numeric_scalar() {
        let params = strings(&["nope"]);
        assert!(flatten_to_felts(&params).is_err());
    }
}
