use jib_service::Error;
use jib_testkit::BOTOX_QUERY;

use super::{doc_ids, providers_with, service};

#[tokio::test]
async fn browse_orders_by_placement_with_unplaced_documents_last() {
	let service = service(providers_with(None, None, None));
	let res = service.browse(BOTOX_QUERY).await.expect("Browse failed.");

	// Placements: 1 -> doc 1, 2 -> doc 3, 3 -> doc 0; docs 2 and 4 keep fusion order.
	assert_eq!(doc_ids(&res.items), vec![1, 3, 0, 2, 4]);
	assert!(res.items.iter().all(|item| item.content.is_none()));
}

#[tokio::test]
async fn browse_rejects_blank_queries() {
	let service = service(providers_with(None, None, None));
	let err = service.browse("").await.expect_err("Expected invalid request.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}
