use jib_domain::{
	alias::QueryAliases,
	geo::{self, GeoPoint},
	text::{Segmenter, normalize_token},
};

#[test]
fn geo_point_round_trips_through_catalog_json() {
	let point: GeoPoint =
		serde_json::from_value(serde_json::json!({ "lat": 13.7563, "lng": 100.5018 }))
			.expect("Failed to parse point.");

	assert!(point.is_valid());
	assert_eq!(point, GeoPoint::new(13.7563, 100.5018));
}

#[test]
fn thonglor_to_silom_is_within_a_city_radius() {
	let thonglor = GeoPoint::new(13.7326, 100.5830);
	let silom = GeoPoint::new(13.7286, 100.5340);
	let km = geo::haversine_km(thonglor, silom);

	assert!(km > 4.0 && km < 7.0, "unexpected distance {km}");
	assert_eq!(km, geo::haversine_km(silom, thonglor));
}

#[test]
fn corpus_vocabulary_drives_query_segmentation() {
	let corpus_tokens = ["ทำฟัน", "ฟอกสีฟัน", "Botox", "ＨＩＦＵ"];
	let segmenter = Segmenter::new(corpus_tokens);

	let expected = ["hifu", "ฟอกสีฟัน", "ทำฟัน"].map(normalize_token);

	assert_eq!(segmenter.tokenize("HIFU ฟอกสีฟันทำฟัน"), expected);
	assert_ne!(normalize_token("ทำฟัน"), "ทำฟัน");
	assert_eq!(normalize_token("ＨＩＦＵ"), "hifu");
}

#[test]
fn aliases_rewrite_before_tokenization() {
	let aliases = QueryAliases::new([("bkk anti aging", "Bangkok Anti Aging Center")])
		.expect("Aliases must compile.");
	let rewritten = aliases.rewrite("BKK Anti Aging hifu");
	let tokens = Segmenter::default().tokenize(&rewritten);

	assert_eq!(tokens, vec!["bangkok", "anti", "aging", "center", "hifu"]);
	assert_eq!(aliases.len(), 1);
}
