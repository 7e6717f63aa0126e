use serde::de::DeserializeOwned;

use crate::server::aggregation::pipeline::{PipelineError, StageKind};
use crate::server::database::error::StoreError;
use crate::server::database::store::{Collection, DocumentStore, Filter};
use crate::server::model::PageParams;

const DEFAULT_PAGE_SIZE: usize = 10;

/// Resolved paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub start_index: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            start_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<&PageParams> for PageRequest {
    /// Unparsable or out-of-range values fall back to the defaults; a valid
    /// `startIndex` wins over the page-derived offset.
    fn from(params: &PageParams) -> Self {
        let page_size = parse(params.record_per_page.as_deref())
            .filter(|size| *size >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE as i64);
        let page = parse(params.page.as_deref())
            .filter(|page| *page >= 1)
            .unwrap_or(1);
        let start = parse(params.start_index.as_deref())
            .filter(|start| *start >= 0)
            .unwrap_or_else(|| (page - 1).saturating_mul(page_size));
        Self {
            start_index: usize::try_from(start).unwrap_or(usize::MAX),
            page_size: usize::try_from(page_size).unwrap_or(usize::MAX),
        }
    }
}

fn parse(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Page<T> {
    pub total_count: usize,
    pub items: Vec<T>,
}

/// Cut one page out of a fully materialized result set. `total_count` is the
/// length before slicing.
pub(crate) fn slice<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_count = items.len();
    let items = items
        .into_iter()
        .skip(request.start_index)
        .take(request.page_size)
        .collect();
    Page { total_count, items }
}

/// Load a whole collection in insertion order and return the requested page.
pub(crate) async fn list_page<S, T>(
    store: &S,
    collection: Collection,
    request: PageRequest,
) -> Result<Page<T>, PipelineError>
where
    S: DocumentStore,
    T: DeserializeOwned,
{
    let docs = store
        .find(collection, &Filter::all())
        .await
        .map_err(PipelineError::at(StageKind::Slice))?;
    let Page { total_count, items } = slice(docs, request);
    let items = items
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect::<Result<Vec<T>, _>>()
        .map_err(PipelineError::at(StageKind::Slice))?;
    Ok(Page { total_count, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::database::memory::MemoryStore;
    use serde_json::{json, Value};

    fn params(page: Option<&str>, per_page: Option<&str>, start: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(str::to_string),
            record_per_page: per_page.map(str::to_string),
            start_index: start.map(str::to_string),
        }
    }

    #[test]
    fn defaults_when_absent_or_invalid() {
        assert_eq!(PageRequest::from(&params(None, None, None)), PageRequest::default());
        assert_eq!(
            PageRequest::from(&params(Some("0"), Some("-3"), Some("-1"))),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::from(&params(Some("abc"), Some("x"), Some(""))),
            PageRequest::default()
        );
    }

    #[test]
    fn page_derives_offset() {
        let request = PageRequest::from(&params(Some("2"), Some("5"), None));
        assert_eq!(request, PageRequest { start_index: 5, page_size: 5 });
    }

    #[test]
    fn start_index_overrides_page() {
        let request = PageRequest::from(&params(Some("3"), Some("5"), Some("1")));
        assert_eq!(request, PageRequest { start_index: 1, page_size: 5 });
    }

    #[test]
    fn slice_matches_reference_for_every_page() {
        for n in 0..=13usize {
            let items: Vec<usize> = (0..n).collect();
            for p in 1..=4usize {
                for k in 1..=5usize {
                    let request = PageRequest {
                        start_index: (k - 1) * p,
                        page_size: p,
                    };
                    let page = slice(items.clone(), request);
                    let lo = ((k - 1) * p).min(n);
                    let hi = n.min(k * p);
                    assert_eq!(page.total_count, n);
                    assert_eq!(page.items, items[lo..hi].to_vec());
                }
            }
        }
    }

    #[test]
    fn slice_past_end_is_empty() {
        let page = slice(vec![1, 2, 3], PageRequest { start_index: 10, page_size: 5 });
        assert_eq!(page, Page { total_count: 3, items: vec![] });
    }

    #[tokio::test]
    async fn second_page_of_twelve_foods() {
        let store = MemoryStore::default();
        let foods = (1..=12).map(|n| json!({"food_id": format!("f{n}")})).collect();
        store.insert_many(Collection::Food, foods).await.unwrap();

        let request = PageRequest::from(&params(Some("2"), Some("5"), None));
        let page: Page<Value> = list_page(&store, Collection::Food, request).await.unwrap();
        assert_eq!(page.total_count, 12);
        let ids: Vec<_> = page.items.iter().map(|f| f["food_id"].clone()).collect();
        assert_eq!(ids, (6..=10).map(|n| json!(format!("f{n}"))).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn empty_collection_is_a_zero_page() {
        let store = MemoryStore::default();
        let page: Page<Value> = list_page(&store, Collection::User, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page, Page { total_count: 0, items: vec![] });
    }
}
