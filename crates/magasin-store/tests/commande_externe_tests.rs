// Integration tests for the external order aggregate
// Same lifecycle as internal orders, against the supplier-side tables

use magasin_core::errors::ExErrorKind;
use magasin_core::model::{
    Article, CommandeExterne, CommandeExterneArticle, CommandeExterneLocal, Fournisseur, Local,
    Magasinier, StatutCommande,
};
use magasin_store::repo::{
    ArticleRepo, CommandeExterneRepo, CommandeInterneRepo, FournisseurRepo, LocalRepo,
    MagasinierRepo,
};
use rusqlite::Connection;

struct Refs {
    magasinier: i64,
    fournisseur: i64,
    quai: i64,
    reserve: i64,
    huile: i64,
    filtre: i64,
}

fn setup_test_db() -> (Connection, Refs) {
    let mut conn = magasin_store::db::open_in_memory().unwrap();
    magasin_store::migrations::apply_migrations(&mut conn).unwrap();

    let magasinier =
        MagasinierRepo::insert(&conn, &mut Magasinier::new("Bruno", "bruno", "h")).unwrap();
    let fournisseur =
        FournisseurRepo::insert(&conn, &mut Fournisseur::new("Lubritech")).unwrap();
    let quai = LocalRepo::insert(&conn, &mut Local::new("Quai de réception")).unwrap();
    let reserve = LocalRepo::insert(&conn, &mut Local::new("Réserve")).unwrap();
    let huile = ArticleRepo::insert(&conn, &mut Article::new("Huile 15W40")).unwrap();
    let filtre = ArticleRepo::insert(&conn, &mut Article::new("Filtre à huile")).unwrap();

    (
        conn,
        Refs {
            magasinier,
            fournisseur,
            quai,
            reserve,
            huile,
            filtre,
        },
    )
}

fn new_commande(refs: &Refs) -> CommandeExterne {
    let mut commande = CommandeExterne::new(refs.magasinier, refs.fournisseur, refs.quai);
    commande.ajouter_article(CommandeExterneArticle::new(refs.huile, 200));
    commande.ajouter_local(CommandeExterneLocal::new(refs.reserve));
    commande
}

fn count_rows(conn: &Connection, table: &str, commande_id: i64) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE commande_externe_id = ?1", table),
        [commande_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn test_insert_round_trip() {
    let (mut conn, refs) = setup_test_db();
    let mut commande = new_commande(&refs);

    let id = CommandeExterneRepo::insert(&mut conn, &mut commande).unwrap();

    let loaded = CommandeExterneRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(loaded, commande);
    assert_eq!(loaded.fournisseur_id(), refs.fournisseur);
    assert_eq!(loaded.articles[0].quantite, 200);
    assert_eq!(loaded.locaux[0].local_id, refs.reserve);
}

#[test]
fn test_families_do_not_share_ids() {
    // An external order id is not visible through the internal repository
    let (mut conn, refs) = setup_test_db();
    let mut commande = new_commande(&refs);
    let id = CommandeExterneRepo::insert(&mut conn, &mut commande).unwrap();

    assert!(CommandeInterneRepo::get_by_id(&conn, id).unwrap().is_none());
}

#[test]
fn test_update_add_remove_modify() {
    // Given: an order with one line and one location
    let (mut conn, refs) = setup_test_db();
    let mut commande = new_commande(&refs);
    let id = CommandeExterneRepo::insert(&mut conn, &mut commande).unwrap();
    let huile_row = commande.articles[0].id.unwrap();
    let local_row = commande.locaux[0].id.unwrap();

    // When: the line quantity changes, a line is added, the location is
    // replaced and the order moves on
    commande.article_mut(huile_row).unwrap().quantite = 150;
    commande.ajouter_article(CommandeExterneArticle::new(refs.filtre, 12));
    commande.retirer_local(local_row).unwrap();
    commande.ajouter_local(CommandeExterneLocal::new(refs.quai));
    commande.statut = StatutCommande::EnCours;
    CommandeExterneRepo::update(&mut conn, &mut commande).unwrap();

    // Then: the store holds exactly the in-memory state
    let loaded = CommandeExterneRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(loaded, commande);
    assert_eq!(loaded.articles.len(), 2);
    assert_eq!(loaded.articles[0].id, Some(huile_row));
    assert_eq!(loaded.articles[0].quantite, 150);
    assert_eq!(loaded.locaux.len(), 1);
    assert_ne!(loaded.locaux[0].id, Some(local_row));
    assert_eq!(loaded.statut, StatutCommande::EnCours);
    assert_eq!(loaded.quantite_totale(), Some(162));
}

#[test]
fn test_update_with_no_changes_only_touches_timestamp() {
    let (mut conn, refs) = setup_test_db();
    let mut commande = new_commande(&refs);
    let id = CommandeExterneRepo::insert(&mut conn, &mut commande).unwrap();
    let lignes = commande.articles.clone();

    CommandeExterneRepo::update(&mut conn, &mut commande).unwrap();

    let loaded = CommandeExterneRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(loaded.articles, lignes);
    assert!(loaded.mise_a_jour_a.is_some());
    assert!(loaded.mise_a_jour_a >= loaded.creer_a);
}

#[test]
fn test_duplicate_row_id_rolls_back() {
    let (mut conn, refs) = setup_test_db();
    let mut commande = new_commande(&refs);
    let id = CommandeExterneRepo::insert(&mut conn, &mut commande).unwrap();
    let before = CommandeExterneRepo::get_by_id(&conn, id).unwrap().unwrap();

    let doublon = commande.articles[0].clone();
    commande.ajouter_article(doublon);
    commande.statut = StatutCommande::Annulee;
    let err = CommandeExterneRepo::update(&mut conn, &mut commande).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvariantViolation);
    assert_eq!(CommandeExterneRepo::get_by_id(&conn, id).unwrap().unwrap(), before);
}

#[test]
fn test_failure_during_reconciliation_is_atomic() {
    let (mut conn, refs) = setup_test_db();
    let mut commande = new_commande(&refs);
    let id = CommandeExterneRepo::insert(&mut conn, &mut commande).unwrap();
    let before = CommandeExterneRepo::get_by_id(&conn, id).unwrap().unwrap();

    commande.statut = StatutCommande::Livree;
    commande.articles.clear();
    commande.ajouter_article(CommandeExterneArticle::new(refs.filtre, 5));
    commande.ajouter_local(CommandeExterneLocal::new(9_999));
    let err = CommandeExterneRepo::update(&mut conn, &mut commande).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    let after = CommandeExterneRepo::get_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(after, before);
    assert_eq!(count_rows(&conn, "commande_externe_article", id), 1);
    assert!(commande.articles[0].id.is_none());
}

#[test]
fn test_delete_cascades_and_is_idempotent() {
    let (mut conn, refs) = setup_test_db();
    let mut commande = new_commande(&refs);
    let id = CommandeExterneRepo::insert(&mut conn, &mut commande).unwrap();

    assert!(CommandeExterneRepo::delete(&mut conn, id).unwrap());
    assert_eq!(count_rows(&conn, "commande_externe_article", id), 0);
    assert_eq!(count_rows(&conn, "commande_externe_local", id), 0);
    assert!(CommandeExterneRepo::get_by_id(&conn, id).unwrap().is_none());

    assert!(!CommandeExterneRepo::delete(&mut conn, id).unwrap());
}

#[test]
fn test_referenced_article_cannot_be_deleted() {
    // Order lines keep their article alive through the foreign key
    let (mut conn, refs) = setup_test_db();
    let mut commande = new_commande(&refs);
    CommandeExterneRepo::insert(&mut conn, &mut commande).unwrap();

    let err = ArticleRepo::delete(&conn, refs.huile).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
}
