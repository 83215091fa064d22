use orderlist::dataset::{Dataset, OrderRow};
use orderlist::filter::{filter_rows, split_webbing};

fn row(id: &str, panel: &str, material: &str) -> OrderRow {
    OrderRow::new(id, panel, material)
}

fn keywords(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

#[test]
fn test_empty_keywords_keep_everything() {
    let rows = vec![row("1", "P1", "Fabric"), row("2", "P2", "Foam")];
    assert_eq!(filter_rows(rows.clone(), &[]), rows);
}

#[test]
fn test_keyword_matches_material_case_insensitively() {
    let rows = vec![
        row("1", "P1", "Blue FOAM sheet"),
        row("2", "P2", "Fabric"),
        row("3", "foam", "Canvas"),
        row("4", "P4", "Thread"),
    ];
    let kept = filter_rows(rows, &keywords(&["foam", "thread"]));
    let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
    // The panel number is never inspected.
    assert_eq!(ids, vec!["2", "3"]);
}

#[test]
fn test_split_webbing_partitions_rows() {
    let dataset = Dataset::create(
        "d",
        vec![
            row("1", "P1", "Webbing Blue"),
            row("2", "P2", "Fabric"),
            row("3", "P3", "black WEBBING 25mm"),
            row("4", "P4", "Strap"),
        ],
    );
    let split = split_webbing(&dataset);

    let regular: Vec<&str> = split.regular.iter().map(|r| r.id.as_str()).collect();
    let webbing: Vec<&str> = split.webbing.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(regular, vec!["2", "4"]);
    assert_eq!(webbing, vec!["1", "3"]);
    assert_eq!(split.regular.len() + split.webbing.len(), dataset.rows.len());
    println!("✓ Webbing split keeps every row exactly once");
}
