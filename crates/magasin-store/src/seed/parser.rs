//! Seed parser with validation
//!
//! Parses YAML and validates schema version, key uniqueness and that every
//! reference names a key declared in the same seed.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result, SeedError};
use crate::seed::format::{SeedCommande, SeedV0};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub(crate) const MAGASINIER: &str = "magasinier";
pub(crate) const CONSOMMATEUR: &str = "consommateur";
pub(crate) const FOURNISSEUR: &str = "fournisseur";
pub(crate) const LOCAL: &str = "local";
pub(crate) const ARTICLE: &str = "article";
pub(crate) const STOCK: &str = "stock";
pub(crate) const COMMANDE_INTERNE: &str = "commande_interne";
pub(crate) const COMMANDE_EXTERNE: &str = "commande_externe";

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<SeedV0> {
    let content = fs::read_to_string(path).map_err(|e| io_error("seed_read", e))?;
    parse_seed_str(&content)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<SeedV0> {
    let seed: SeedV0 =
        serde_yaml::from_str(content).map_err(|e| SeedError::Parse(e.to_string()))?;

    validate_seed(&seed)?;

    Ok(seed)
}

fn unique_keys<'a>(
    kind: &'static str,
    keys: impl Iterator<Item = &'a String>,
) -> std::result::Result<HashSet<&'a str>, SeedError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.as_str()) {
            return Err(SeedError::DuplicateKey {
                kind,
                key: key.clone(),
            });
        }
    }
    Ok(seen)
}

/// Check one reference against the declared keys of its kind
fn resolves(
    keys: &HashSet<&str>,
    owner: &'static str,
    owner_key: &str,
    kind: &'static str,
    key: &str,
) -> std::result::Result<(), SeedError> {
    if keys.contains(key) {
        Ok(())
    } else {
        Err(SeedError::UnresolvedReference {
            owner,
            owner_key: owner_key.to_string(),
            kind,
            key: key.to_string(),
        })
    }
}

/// Validate a parsed seed
fn validate_seed(seed: &SeedV0) -> std::result::Result<(), SeedError> {
    if seed.schema_version != 0 {
        return Err(SeedError::UnsupportedVersion(seed.schema_version));
    }

    let magasiniers = unique_keys(MAGASINIER, seed.magasiniers.iter().map(|m| &m.key))?;
    let consommateurs = unique_keys(CONSOMMATEUR, seed.consommateurs.iter().map(|c| &c.key))?;
    let fournisseurs = unique_keys(FOURNISSEUR, seed.fournisseurs.iter().map(|f| &f.key))?;
    let locaux = unique_keys(LOCAL, seed.locaux.iter().map(|l| &l.key))?;
    let articles = unique_keys(ARTICLE, seed.articles.iter().map(|a| &a.key))?;
    unique_keys(
        COMMANDE_INTERNE,
        seed.commandes_internes.iter().map(|c| &c.key),
    )?;
    unique_keys(
        COMMANDE_EXTERNE,
        seed.commandes_externes.iter().map(|c| &c.key),
    )?;

    for local in &seed.locaux {
        if let Some(responsable) = &local.responsable {
            resolves(&magasiniers, LOCAL, &local.key, MAGASINIER, responsable)?;
        }
    }

    for stock in &seed.stocks {
        let owner_key = format!("{}@{}", stock.article, stock.local);
        resolves(&articles, STOCK, &owner_key, ARTICLE, &stock.article)?;
        resolves(&locaux, STOCK, &owner_key, LOCAL, &stock.local)?;
    }

    let check_commande = |owner: &'static str,
                          counterpart_kind: &'static str,
                          counterparts: &HashSet<&str>,
                          commande: &SeedCommande|
     -> std::result::Result<(), SeedError> {
        resolves(&magasiniers, owner, &commande.key, MAGASINIER, &commande.magasinier)?;
        resolves(
            counterparts,
            owner,
            &commande.key,
            counterpart_kind,
            &commande.contrepartie,
        )?;
        resolves(&locaux, owner, &commande.key, LOCAL, &commande.local)?;
        for ligne in &commande.articles {
            resolves(&articles, owner, &commande.key, ARTICLE, &ligne.article)?;
        }
        for localisation in &commande.locaux {
            resolves(&locaux, owner, &commande.key, LOCAL, &localisation.local)?;
        }
        Ok(())
    };

    for commande in &seed.commandes_internes {
        check_commande(COMMANDE_INTERNE, CONSOMMATEUR, &consommateurs, commande)?;
    }
    for commande in &seed.commandes_externes {
        check_commande(COMMANDE_EXTERNE, FOURNISSEUR, &fournisseurs, commande)?;
    }

    Ok(())
}
