//! Dataset loading and list-field decoding.

mod common;

use common::{dataset_csv, recipes, write_dataset};
use recipe_crud_bench::dataset::{load_recipes, read_recipes, ListEncoding};

#[test]
fn json_encoding_round_trips_fixture() {
    let expected = recipes(25);
    let csv = dataset_csv(&expected, ListEncoding::Json);
    let loaded = read_recipes(csv.as_bytes(), ListEncoding::Json, None).unwrap();
    assert_eq!(loaded, expected);
}

#[test]
fn bracketed_encoding_splits_on_commas() {
    let expected = recipes(5);
    let csv = dataset_csv(&expected, ListEncoding::Bracketed);
    let loaded = read_recipes(csv.as_bytes(), ListEncoding::Bracketed, None).unwrap();
    assert_eq!(loaded.len(), 5);
    assert_eq!(loaded[3].ner, expected[3].ner);
    assert_eq!(loaded[3].directions, expected[3].directions);
}

#[test]
fn bracketed_elements_are_kept_verbatim() {
    let csv = "title,ingredients,directions,link,source,NER\n\
               Soup,\"[\"\"1 c. water\"\", \"\"salt\"\"]\",[Boil.],x, Gathered ,\"[\"\"water\"\", \"\"salt\"\"]\"\n";
    let loaded = read_recipes(csv.as_bytes(), ListEncoding::Bracketed, None).unwrap();
    let r = &loaded[0];
    assert_eq!(r.ingredients, vec!["\"1 c. water\"", " \"salt\""]);
    assert_eq!(r.ner, vec!["\"water\"", " \"salt\""]);
    assert_eq!(r.directions, vec!["Boil."]);
    assert_eq!(r.source, "Gathered");
}

#[test]
fn empty_bracketed_field_is_empty_list() {
    let csv = "title,ingredients,directions,link,source,NER\nToast,,[],x,y,\"  \"\n";
    let loaded = read_recipes(csv.as_bytes(), ListEncoding::Bracketed, None).unwrap();
    assert!(loaded[0].ingredients.is_empty());
    assert_eq!(loaded[0].directions, vec![""]);
    assert!(loaded[0].ner.is_empty());
}

#[test]
fn limit_caps_rows_read() {
    let csv = dataset_csv(&recipes(100), ListEncoding::Json);
    let loaded = read_recipes(csv.as_bytes(), ListEncoding::Json, Some(30)).unwrap();
    assert_eq!(loaded.len(), 30);
    assert_eq!(loaded.last().unwrap().title, "Recipe 29");
}

#[test]
fn malformed_json_row_is_skipped_but_counts_toward_limit() {
    let csv = "title,ingredients,directions,link,source,NER\n\
               A,\"[\"\"x\"\"]\",\"[\"\"y\"\"]\",l,s,\"[\"\"z\"\"]\"\n\
               B,not json,\"[]\",l,s,\"[]\"\n\
               C,\"[]\",\"[]\",l,s,\"[]\"\n\
               D,\"[]\",\"[]\",l,s,\"[]\"\n";
    let loaded = read_recipes(csv.as_bytes(), ListEncoding::Json, Some(3)).unwrap();
    let titles: Vec<_> = loaded.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "C"]);
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dataset(&dir, &recipes(12), ListEncoding::Json);
    let loaded = load_recipes(&path, ListEncoding::Json, Some(10)).unwrap();
    assert_eq!(loaded.len(), 10);
    assert_eq!(loaded[7].title, "Baked Chicken Parmesan");
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_recipes(&dir.path().join("absent.csv"), ListEncoding::Json, None).unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
}
