//! Seed importer orchestration
//!
//! Imports a validated seed through the repositories, inside one
//! transaction: either every entity of the seed is created or none is.

#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use magasin_core::model::{
    Article, CommandeExterne, CommandeExterneArticle, CommandeExterneLocal, CommandeInterne,
    CommandeInterneArticle, CommandeInterneLocal, Consommateur, EtatArticle, Fournisseur, Local,
    Magasinier, StatutCommande, Stock,
};
use magasin_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::{Connection, Transaction};
use serde::Serialize;

use crate::errors::{from_rusqlite, Result, SeedError};
use crate::repo::{
    ArticleRepo, CommandeExterneRepo, CommandeInterneRepo, ConsommateurRepo, FournisseurRepo,
    LocalRepo, MagasinierRepo, StockRepo,
};
use crate::seed::format::{SeedCommande, SeedV0};
use crate::seed::parser::{
    parse_seed_file, ARTICLE, COMMANDE_EXTERNE, COMMANDE_INTERNE, CONSOMMATEUR, FOURNISSEUR,
    LOCAL, MAGASINIER, STOCK,
};

/// What an import created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Rows created per entity kind
    pub created: BTreeMap<String, usize>,
    /// Seed key to store-assigned id, per entity kind
    pub ids: BTreeMap<String, BTreeMap<String, i64>>,
}

impl SeedSummary {
    /// Store id assigned to a seed key
    pub fn id_of(&self, kind: &str, key: &str) -> Option<i64> {
        self.ids.get(kind).and_then(|ids| ids.get(key)).copied()
    }

    fn record(&mut self, kind: &'static str, key: Option<&str>, id: i64) {
        *self.created.entry(kind.to_string()).or_default() += 1;
        if let Some(key) = key {
            self.ids
                .entry(kind.to_string())
                .or_default()
                .insert(key.to_string(), id);
        }
    }

    fn resolve(
        &self,
        owner: &'static str,
        owner_key: &str,
        kind: &'static str,
        key: &str,
    ) -> Result<i64> {
        self.id_of(kind, key).ok_or_else(|| {
            SeedError::UnresolvedReference {
                owner,
                owner_key: owner_key.to_string(),
                kind,
                key: key.to_string(),
            }
            .into()
        })
    }
}

/// Import a seed file into the database
///
/// Parses and validates the file first; nothing is written if validation
/// fails.
pub fn import_seed(path: &Path, conn: &mut Connection) -> Result<SeedSummary> {
    log_op_start!("seed_import", path = %path.display());
    let start = Instant::now();

    let result = parse_seed_file(path).and_then(|seed| import_parsed(&seed, conn));

    match &result {
        Ok(summary) => {
            log_op_end!(
                "seed_import",
                duration_ms = start.elapsed().as_millis() as u64,
                entities = summary.created.values().sum::<usize>() as u64
            );
        }
        Err(e) => {
            log_op_error!(
                "seed_import",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
        }
    }

    result
}

/// Import an already parsed and validated seed
pub fn import_parsed(seed: &SeedV0, conn: &mut Connection) -> Result<SeedSummary> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    match import_tx(&tx, seed) {
        Ok(summary) => {
            tx.commit().map_err(from_rusqlite)?;
            Ok(summary)
        }
        Err(err) => {
            tracing::warn!(op = "seed_import", err_code = err.code(), "rolling back seed");
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(op = "seed_import", error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

fn import_tx(tx: &Transaction<'_>, seed: &SeedV0) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for m in &seed.magasiniers {
        let mut magasinier = Magasinier::new(&m.nom, &m.nom_utilisateur, &m.mot_de_passe_hash);
        magasinier.actif = m.actif;
        let id = MagasinierRepo::insert(tx, &mut magasinier)?;
        summary.record(MAGASINIER, Some(&m.key), id);
    }

    for c in &seed.consommateurs {
        let mut consommateur = Consommateur::new(&c.nom);
        consommateur.email = c.email.clone();
        consommateur.telephone = c.telephone.clone();
        consommateur.departement = c.departement.clone();
        consommateur.description = c.description.clone();
        let id = ConsommateurRepo::insert(tx, &mut consommateur)?;
        summary.record(CONSOMMATEUR, Some(&c.key), id);
    }

    for f in &seed.fournisseurs {
        let mut fournisseur = Fournisseur::new(&f.nom);
        fournisseur.adresse = f.adresse.clone();
        fournisseur.telephone = f.telephone.clone();
        fournisseur.email = f.email.clone();
        fournisseur.site_web = f.site_web.clone();
        fournisseur.contact_principal = f.contact_principal.clone();
        let id = FournisseurRepo::insert(tx, &mut fournisseur)?;
        summary.record(FOURNISSEUR, Some(&f.key), id);
    }

    for l in &seed.locaux {
        let mut local = Local::new(&l.nom);
        local.emplacement = l.emplacement.clone();
        local.type_local = l.type_local.clone();
        local.responsable_id = match &l.responsable {
            Some(key) => Some(summary.resolve(LOCAL, &l.key, MAGASINIER, key)?),
            None => None,
        };
        let id = LocalRepo::insert(tx, &mut local)?;
        summary.record(LOCAL, Some(&l.key), id);
    }

    for a in &seed.articles {
        let mut article = Article::new(&a.nom);
        article.description = a.description.clone();
        article.categorie = a.categorie.clone();
        article.unite = a.unite.clone();
        article.quantite_min = a.quantite_min;
        article.critique = a.critique;
        article.actif = a.actif;
        let id = ArticleRepo::insert(tx, &mut article)?;
        summary.record(ARTICLE, Some(&a.key), id);
    }

    for s in &seed.stocks {
        let owner_key = format!("{}@{}", s.article, s.local);
        let article_id = summary.resolve(STOCK, &owner_key, ARTICLE, &s.article)?;
        let local_id = summary.resolve(STOCK, &owner_key, LOCAL, &s.local)?;
        let mut stock = Stock::new(article_id, local_id, s.quantite);
        let id = StockRepo::insert(tx, &mut stock)?;
        summary.record(STOCK, None, id);
    }

    for c in &seed.commandes_internes {
        let mut commande = build_interne(&summary, c)?;
        let id = CommandeInterneRepo::insert_tx(tx, &mut commande)?;
        summary.record(COMMANDE_INTERNE, Some(&c.key), id);
    }

    for c in &seed.commandes_externes {
        let mut commande = build_externe(&summary, c)?;
        let id = CommandeExterneRepo::insert_tx(tx, &mut commande)?;
        summary.record(COMMANDE_EXTERNE, Some(&c.key), id);
    }

    Ok(summary)
}

/// Parent references shared by both families: (magasinier, local)
fn resolve_parent(
    summary: &SeedSummary,
    owner: &'static str,
    c: &SeedCommande,
) -> Result<(i64, i64)> {
    Ok((
        summary.resolve(owner, &c.key, MAGASINIER, &c.magasinier)?,
        summary.resolve(owner, &c.key, LOCAL, &c.local)?,
    ))
}

fn build_interne(summary: &SeedSummary, c: &SeedCommande) -> Result<CommandeInterne> {
    let (magasinier_id, local_id) = resolve_parent(summary, COMMANDE_INTERNE, c)?;
    let consommateur_id =
        summary.resolve(COMMANDE_INTERNE, &c.key, CONSOMMATEUR, &c.contrepartie)?;

    let mut commande = CommandeInterne::new(magasinier_id, consommateur_id, local_id);
    if let Some(statut) = &c.statut {
        commande.statut = StatutCommande::from(statut.as_str());
    }
    for ligne in &c.articles {
        let article_id = summary.resolve(COMMANDE_INTERNE, &c.key, ARTICLE, &ligne.article)?;
        let mut article = CommandeInterneArticle::new(article_id, ligne.quantite);
        if let Some(etat) = &ligne.etat {
            article = article.with_etat(EtatArticle::from(etat.as_str()));
        }
        if let Some(notes) = &ligne.notes {
            article = article.with_notes(notes.clone());
        }
        commande.ajouter_article(article);
    }
    for localisation in &c.locaux {
        let local_id = summary.resolve(COMMANDE_INTERNE, &c.key, LOCAL, &localisation.local)?;
        let mut local = CommandeInterneLocal::new(local_id);
        if let Some(notes) = &localisation.notes {
            local = local.with_notes(notes.clone());
        }
        commande.ajouter_local(local);
    }
    Ok(commande)
}

fn build_externe(summary: &SeedSummary, c: &SeedCommande) -> Result<CommandeExterne> {
    let (magasinier_id, local_id) = resolve_parent(summary, COMMANDE_EXTERNE, c)?;
    let fournisseur_id =
        summary.resolve(COMMANDE_EXTERNE, &c.key, FOURNISSEUR, &c.contrepartie)?;

    let mut commande = CommandeExterne::new(magasinier_id, fournisseur_id, local_id);
    if let Some(statut) = &c.statut {
        commande.statut = StatutCommande::from(statut.as_str());
    }
    for ligne in &c.articles {
        let article_id = summary.resolve(COMMANDE_EXTERNE, &c.key, ARTICLE, &ligne.article)?;
        commande.ajouter_article(CommandeExterneArticle::new(article_id, ligne.quantite));
    }
    for localisation in &c.locaux {
        let local_id = summary.resolve(COMMANDE_EXTERNE, &c.key, LOCAL, &localisation.local)?;
        commande.ajouter_local(CommandeExterneLocal::new(local_id));
    }
    Ok(commande)
}
