/// One tab-delimited line, split into its raw string fields. Field counts
/// vary per row; the validator enforces the per-source minimum.
pub type RawRecord = Vec<String>;

/// Split a tail buffer into rows (newline) and fields (tab), preserving
/// file order.
///
/// Parsing halts at the first row consisting of a single empty field; the
/// format has no other end-of-usable-input marker, so such a row is the
/// sentinel for "no more complete records". Rows past it are ignored.
///
/// Input that is not valid UTF-8 (a truncated multi-byte sequence at a
/// window edge, for example) is decoded lossily; the affected row then
/// fails validation instead of aborting the batch.
pub fn parse_records(buf: &[u8]) -> Vec<RawRecord> {
    let text = String::from_utf8_lossy(buf);
    let mut rows = Vec::new();

    for line in text.lines() {
        let fields: Vec<String> = line.split('\t').map(str::to_owned).collect();
        if fields.len() == 1 && fields[0].is_empty() {
            break;
        }
        rows.push(fields);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_rows_and_fields_in_file_order() {
        let rows = parse_records(b"1\tbkt\t0\n2\tbkt\t1\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["1", "bkt", "0"]);
        assert_eq!(rows[1], vec!["2", "bkt", "1"]);
    }

    #[test]
    fn heterogeneous_field_counts_are_allowed() {
        let rows = parse_records(b"a\tb\nc\td\te\tf\n");
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 4);
    }

    #[test]
    fn blank_row_is_an_end_sentinel() {
        let rows = parse_records(b"1\tbkt\n\n2\tbkt\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec!["1", "bkt"]);
    }

    #[test]
    fn single_nonempty_field_row_is_kept_for_validation() {
        let rows = parse_records(b"garbage\n1\tbkt\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["garbage"]);
    }

    #[test]
    fn final_unterminated_row_is_included() {
        let rows = parse_records(b"1\tbkt\n2\tbk");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["2", "bk"]);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_records(b"").is_empty());
    }
}
