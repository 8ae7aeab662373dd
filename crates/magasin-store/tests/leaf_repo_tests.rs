// Integration tests for the single-table repositories

use magasin_core::errors::ExErrorKind;
use magasin_core::model::{Article, Consommateur, Fournisseur, Local, Magasinier, Stock};
use magasin_store::repo::{
    ArticleRepo, ConsommateurRepo, FournisseurRepo, LocalRepo, MagasinierRepo, StockRepo,
};
use rusqlite::Connection;

fn setup_test_db() -> Connection {
    let mut conn = magasin_store::db::open_in_memory().unwrap();
    magasin_store::migrations::apply_migrations(&mut conn).unwrap();
    conn
}

#[test]
fn test_article_crud() {
    let conn = setup_test_db();

    // Insert assigns id and equal creation/update stamps
    let mut article = Article::new("Disjoncteur 16A");
    article.categorie = Some("Électricité".to_string());
    article.quantite_min = 5;
    let id = ArticleRepo::insert(&conn, &mut article).unwrap();
    assert_eq!(article.id, Some(id));
    assert!(article.created_at.is_some());
    assert_eq!(article.created_at, article.updated_at);

    let loaded = ArticleRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(loaded, article);

    // Update persists every mutable field and refreshes updated_at
    article.nom = "Disjoncteur 20A".to_string();
    article.critique = true;
    ArticleRepo::update(&conn, &mut article).unwrap();
    let loaded = ArticleRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(loaded.nom, "Disjoncteur 20A");
    assert!(loaded.critique);
    assert_eq!(loaded.created_at, article.created_at);
    assert!(loaded.updated_at >= loaded.created_at);
    assert_eq!(loaded.updated_at, article.updated_at);

    // Delete reports whether a row existed
    assert!(ArticleRepo::delete(&conn, id).unwrap());
    assert!(!ArticleRepo::delete(&conn, id).unwrap());
    assert!(ArticleRepo::get_by_id(&conn, id).unwrap().is_none());
}

#[test]
fn test_update_requires_persisted_row() {
    let conn = setup_test_db();

    let mut jamais_insere = Fournisseur::new("Fantôme");
    let err = FournisseurRepo::update(&conn, &mut jamais_insere).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);

    let mut disparu = Fournisseur::new("Disparu");
    disparu.id = Some(77);
    let err = FournisseurRepo::update(&conn, &mut disparu).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.entity(), Some("fournisseur"));
    assert_eq!(err.entity_id(), Some("77"));
}

#[test]
fn test_insert_persisted_entity_is_rejected() {
    let conn = setup_test_db();
    let mut consommateur = Consommateur::new("Atelier mécanique");
    ConsommateurRepo::insert(&conn, &mut consommateur).unwrap();

    let err = ConsommateurRepo::insert(&conn, &mut consommateur).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
}

#[test]
fn test_consommateur_has_no_timestamps() {
    let conn = setup_test_db();
    let mut consommateur = Consommateur::new("Bureau d'études");
    consommateur.departement = Some("R&D".to_string());

    let id = ConsommateurRepo::insert(&conn, &mut consommateur).unwrap();
    consommateur.email = Some("be@example.org".to_string());
    ConsommateurRepo::update(&conn, &mut consommateur).unwrap();

    let loaded = ConsommateurRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(loaded, consommateur);
}

#[test]
fn test_local_type_and_responsable() {
    let conn = setup_test_db();
    let responsable =
        MagasinierRepo::insert(&conn, &mut Magasinier::new("Chloé", "chloe", "h")).unwrap();

    let mut local = Local::new("Magasin central");
    local.type_local = Some("magasin".to_string());
    local.responsable_id = Some(responsable);
    let id = LocalRepo::insert(&conn, &mut local).unwrap();

    let loaded = LocalRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(loaded.type_local.as_deref(), Some("magasin"));
    assert_eq!(loaded.responsable_id, Some(responsable));

    local.responsable_id = Some(404);
    let err = LocalRepo::update(&conn, &mut local).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
}

#[test]
fn test_magasinier_username_and_login() {
    let conn = setup_test_db();
    let mut magasinier = Magasinier::new("David", "david", "$argon2id$v=19$abc");
    let id = MagasinierRepo::insert(&conn, &mut magasinier).unwrap();
    assert!(magasinier.dernier_connexion.is_none());

    let found = MagasinierRepo::find_by_username(&conn, "david").unwrap().unwrap();
    assert_eq!(found.id, Some(id));
    assert_eq!(found.mot_de_passe_hash.expose(), "$argon2id$v=19$abc");
    assert!(MagasinierRepo::find_by_username(&conn, "eve").unwrap().is_none());

    let at = MagasinierRepo::record_login(&conn, id).unwrap();
    let loaded = MagasinierRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(loaded.dernier_connexion, Some(at));

    let err = MagasinierRepo::record_login(&conn, 999).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_magasinier_username_is_unique() {
    let conn = setup_test_db();
    MagasinierRepo::insert(&conn, &mut Magasinier::new("Eve", "eve", "h1")).unwrap();

    let err = MagasinierRepo::insert(&conn, &mut Magasinier::new("Eve bis", "eve", "h2"))
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
}

#[test]
fn test_article_list_critical() {
    let conn = setup_test_db();
    let mut courant = Article::new("Chiffon");
    let mut critique = Article::new("Fusible");
    critique.critique = true;
    let mut retire = Article::new("Ancien fusible");
    retire.critique = true;
    retire.actif = false;
    for article in [&mut courant, &mut critique, &mut retire] {
        ArticleRepo::insert(&conn, article).unwrap();
    }

    let critiques = ArticleRepo::list_critical(&conn).unwrap();

    assert_eq!(critiques, vec![critique]);
    assert_eq!(ArticleRepo::list(&conn).unwrap().len(), 3);
}

#[test]
fn test_stock_lookup_and_uniqueness() {
    let conn = setup_test_db();
    let vis = ArticleRepo::insert(&conn, &mut Article::new("Vis")).unwrap();
    let clou = ArticleRepo::insert(&conn, &mut Article::new("Clou")).unwrap();
    let a = LocalRepo::insert(&conn, &mut Local::new("A")).unwrap();
    let b = LocalRepo::insert(&conn, &mut Local::new("B")).unwrap();

    let mut vis_a = Stock::new(vis, a, 40);
    StockRepo::insert(&conn, &mut vis_a).unwrap();
    StockRepo::insert(&conn, &mut Stock::new(clou, a, 7)).unwrap();
    StockRepo::insert(&conn, &mut Stock::new(vis, b, 3)).unwrap();

    let found = StockRepo::find_by_article_and_local(&conn, vis, a)
        .unwrap()
        .unwrap();
    assert_eq!(found, vis_a);
    assert!(StockRepo::find_by_article_and_local(&conn, clou, b)
        .unwrap()
        .is_none());

    let dans_a = StockRepo::list_by_local(&conn, a).unwrap();
    assert_eq!(dans_a.len(), 2);
    assert!(dans_a.iter().all(|s| s.local_id == a));

    // One row per (article, local)
    let err = StockRepo::insert(&conn, &mut Stock::new(vis, a, 1)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);

    vis_a.quantite = 35;
    StockRepo::update(&conn, &mut vis_a).unwrap();
    let loaded = StockRepo::get_by_id(&conn, vis_a.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.quantite, 35);
}

#[test]
fn test_stock_requires_existing_article() {
    let conn = setup_test_db();
    let local = LocalRepo::insert(&conn, &mut Local::new("A")).unwrap();

    let err = StockRepo::insert(&conn, &mut Stock::new(12, local, 1)).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    assert!(err.message().contains("FOREIGN KEY"));
}

#[test]
fn test_list_orders_by_id() {
    let conn = setup_test_db();
    for nom in ["Zeta", "Alpha", "Mu"] {
        FournisseurRepo::insert(&conn, &mut Fournisseur::new(nom)).unwrap();
    }

    let noms: Vec<String> = FournisseurRepo::list(&conn)
        .unwrap()
        .into_iter()
        .map(|f| f.nom)
        .collect();

    assert_eq!(noms, vec!["Zeta", "Alpha", "Mu"]);
}
