/// Offset-as-cursor pagination, shared by every listing endpoint: the
/// `page` query param is a row offset, and the response's `nextPage` is
/// the next offset when more rows exist, else null.
pub fn next_page(total: usize, offset: usize, returned: usize) -> Option<usize> {
    if total > offset + returned {
        Some(offset + returned)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_page_is_offset_plus_returned_when_more_rows_exist() {
        assert_eq!(next_page(10, 0, 4), Some(4));
        assert_eq!(next_page(10, 4, 4), Some(8));
    }

    #[test]
    fn next_page_is_none_on_the_last_page() {
        assert_eq!(next_page(10, 8, 2), None);
        assert_eq!(next_page(4, 0, 4), None);
        assert_eq!(next_page(0, 0, 0), None);
    }

    #[test]
    fn following_cursors_yields_exactly_total_items_without_duplicates() {
        // Walk a simulated 11-row listing with page size 4 the way a
        // client would, concatenating pages until nextPage is null.
        let total = 11usize;
        let page_size = 4usize;
        let mut offset = 0usize;
        let mut seen = Vec::new();

        loop {
            let returned: Vec<usize> = (offset..total.min(offset + page_size)).collect();
            seen.extend(returned.iter().copied());
            match next_page(total, offset, returned.len()) {
                Some(next) => offset = next,
                None => break,
            }
        }

        assert_eq!(seen.len(), total);
        let mut deduped = seen.clone();
        deduped.dedup();
        assert_eq!(deduped, seen);
    }
}
