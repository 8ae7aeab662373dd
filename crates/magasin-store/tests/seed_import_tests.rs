// Integration tests for YAML seed import

use magasin_core::errors::ExErrorKind;
use magasin_core::model::{EtatArticle, StatutCommande};
use magasin_store::repo::{
    ArticleRepo, CommandeExterneRepo, CommandeInterneRepo, LocalRepo, StockRepo,
};
use magasin_store::seed::{import_parsed, import_seed, parse_seed_str};
use rusqlite::Connection;
use std::path::PathBuf;

fn setup_test_db() -> Connection {
    let mut conn = magasin_store::db::open_in_memory().unwrap();
    magasin_store::migrations::apply_migrations(&mut conn).unwrap();
    conn
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn table_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn test_import_full_seed() {
    // Given: a seed covering every entity kind
    let mut conn = setup_test_db();
    let path = fixtures_dir().join("seed_inventory.yaml");

    // When: it is imported
    let summary = import_seed(&path, &mut conn).unwrap();

    // Then: the summary counts what was created
    assert_eq!(summary.created.get("magasinier"), Some(&1));
    assert_eq!(summary.created.get("consommateur"), Some(&2));
    assert_eq!(summary.created.get("stock"), Some(&2));
    assert_eq!(summary.created.get("commande_interne"), Some(&2));
    assert_eq!(summary.created.get("commande_externe"), Some(&1));

    // And: references were resolved to store ids
    let reserve = summary.id_of("local", "reserve").unwrap();
    let local = LocalRepo::get_by_id(&conn, reserve).unwrap().unwrap();
    assert_eq!(local.responsable_id, summary.id_of("magasinier", "ana"));

    let huile = summary.id_of("article", "huile").unwrap();
    let stock = StockRepo::find_by_article_and_local(&conn, huile, reserve)
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantite, 120);
    assert_eq!(ArticleRepo::list_critical(&conn).unwrap().len(), 1);

    // And: orders came in with their children
    let ci_id = summary.id_of("commande_interne", "ci-001").unwrap();
    let ci = CommandeInterneRepo::get_by_id(&conn, ci_id).unwrap().unwrap();
    assert_eq!(ci.articles.len(), 2);
    assert_eq!(ci.articles[0].etat, EtatArticle::Neuf);
    assert_eq!(ci.articles[1].notes.as_deref(), Some("taille L"));
    assert_eq!(ci.locaux[0].notes.as_deref(), Some("livraison poste 3"));
    assert_eq!(
        ci.consommateur_id(),
        summary.id_of("consommateur", "maintenance").unwrap()
    );

    let ce_id = summary.id_of("commande_externe", "ce-001").unwrap();
    let ce = CommandeExterneRepo::get_by_id(&conn, ce_id).unwrap().unwrap();
    assert_eq!(ce.statut, StatutCommande::EnCours);
    assert_eq!(ce.quantite_totale(), Some(200));

    let validees = CommandeInterneRepo::list_by_statut(&conn, &StatutCommande::Validee).unwrap();
    assert_eq!(validees.len(), 1);
    assert!(validees[0].articles.is_empty());
}

#[test]
fn test_invalid_seed_writes_nothing() {
    let mut conn = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(
        &path,
        "schema_version: 0\nstocks:\n  - article: vis\n    local: reserve\n    quantite: 1\n",
    )
    .unwrap();

    let err = import_seed(&path, &mut conn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Seed);
    assert_eq!(table_count(&conn, "stock"), 0);
}

#[test]
fn test_store_failure_rolls_back_whole_seed() {
    // Given: a seed that validates but breaks the username uniqueness
    let mut conn = setup_test_db();
    let seed = parse_seed_str(
        r#"
schema_version: 0
magasiniers:
  - key: a
    nom: A
    nom_utilisateur: meme
    mot_de_passe_hash: x
  - key: b
    nom: B
    nom_utilisateur: meme
    mot_de_passe_hash: y
articles:
  - key: vis
    nom: Vis
"#,
    )
    .unwrap();

    // When: it is imported
    let err = import_parsed(&seed, &mut conn).unwrap_err();

    // Then: nothing from the seed remains
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    assert_eq!(table_count(&conn, "magasinier"), 0);
    assert_eq!(table_count(&conn, "article"), 0);
}

#[test]
fn test_missing_file_is_io_error() {
    let mut conn = setup_test_db();

    let err = import_seed(&fixtures_dir().join("absent.yaml"), &mut conn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Io);
}
