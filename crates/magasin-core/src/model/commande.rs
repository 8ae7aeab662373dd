//! Order aggregates
//!
//! An order (`Commande`) owns two child collections: article lines and
//! location associations. Internal and external orders share the same
//! shape and differ only in the counterpart they reference and in the
//! extra columns their child rows carry, so both are one generic
//! [`Commande<F>`] parameterized by an [`OrderFamily`].
//!
//! Children never point back at the parent object. They hold the owning
//! order's id once the store has assigned one, and their own row id once
//! persisted. That row id is what update reconciliation keys on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::statut::{EtatArticle, StatutCommande};

/// Identity bookkeeping shared by every child row of an order
pub trait OrderChild: Clone + Debug + PartialEq {
    /// Row identity assigned by the store, `None` for a line not yet persisted
    fn row_id(&self) -> Option<i64>;

    /// Owning order id, `None` until the line has been persisted
    fn commande_id(&self) -> Option<i64>;

    /// Record the identity assigned by the store and the owning order
    fn attach(&mut self, row_id: i64, commande_id: i64);
}

/// A child row referencing an article with a quantity
pub trait ArticleLine: OrderChild {
    fn article_id(&self) -> i64;
    fn quantite(&self) -> i64;
}

/// A child row associating the order with a location
pub trait LocalLine: OrderChild {
    fn local_id(&self) -> i64;
}

/// Capability set of one order family
pub trait OrderFamily: Clone + Debug + PartialEq + Default + Send + Sync + 'static {
    /// Short family name ("interne" / "externe"), used in table names and errors
    const NAME: &'static str;

    type LigneArticle: ArticleLine;
    type LigneLocal: LocalLine;
}

/// Internal orders: a consumer requests articles from the storeroom
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interne;

/// External orders: the storeroom buys articles from a supplier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Externe;

impl OrderFamily for Interne {
    const NAME: &'static str = "interne";
    type LigneArticle = CommandeInterneArticle;
    type LigneLocal = CommandeInterneLocal;
}

impl OrderFamily for Externe {
    const NAME: &'static str = "externe";
    type LigneArticle = CommandeExterneArticle;
    type LigneLocal = CommandeExterneLocal;
}

/// Article line of an internal order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandeInterneArticle {
    pub id: Option<i64>,
    pub commande_id: Option<i64>,
    pub article_id: i64,
    pub quantite: i64,
    pub etat: EtatArticle,
    pub notes: Option<String>,
}

impl CommandeInterneArticle {
    pub fn new(article_id: i64, quantite: i64) -> Self {
        Self {
            id: None,
            commande_id: None,
            article_id,
            quantite,
            etat: EtatArticle::default(),
            notes: None,
        }
    }

    pub fn with_etat(mut self, etat: EtatArticle) -> Self {
        self.etat = etat;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Location association of an internal order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandeInterneLocal {
    pub id: Option<i64>,
    pub commande_id: Option<i64>,
    pub local_id: i64,
    pub notes: Option<String>,
}

impl CommandeInterneLocal {
    pub fn new(local_id: i64) -> Self {
        Self {
            id: None,
            commande_id: None,
            local_id,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Article line of an external order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandeExterneArticle {
    pub id: Option<i64>,
    pub commande_id: Option<i64>,
    pub article_id: i64,
    pub quantite: i64,
}

impl CommandeExterneArticle {
    pub fn new(article_id: i64, quantite: i64) -> Self {
        Self {
            id: None,
            commande_id: None,
            article_id,
            quantite,
        }
    }
}

/// Location association of an external order (delivery location)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandeExterneLocal {
    pub id: Option<i64>,
    pub commande_id: Option<i64>,
    pub local_id: i64,
}

impl CommandeExterneLocal {
    pub fn new(local_id: i64) -> Self {
        Self {
            id: None,
            commande_id: None,
            local_id,
        }
    }
}

macro_rules! impl_order_child {
    ($($ty:ty),+) => {
        $(
            impl OrderChild for $ty {
                fn row_id(&self) -> Option<i64> {
                    self.id
                }

                fn commande_id(&self) -> Option<i64> {
                    self.commande_id
                }

                fn attach(&mut self, row_id: i64, commande_id: i64) {
                    self.id = Some(row_id);
                    self.commande_id = Some(commande_id);
                }
            }
        )+
    };
}

impl_order_child!(
    CommandeInterneArticle,
    CommandeInterneLocal,
    CommandeExterneArticle,
    CommandeExterneLocal
);

impl ArticleLine for CommandeInterneArticle {
    fn article_id(&self) -> i64 {
        self.article_id
    }

    fn quantite(&self) -> i64 {
        self.quantite
    }
}

impl ArticleLine for CommandeExterneArticle {
    fn article_id(&self) -> i64 {
        self.article_id
    }

    fn quantite(&self) -> i64 {
        self.quantite
    }
}

impl LocalLine for CommandeInterneLocal {
    fn local_id(&self) -> i64 {
        self.local_id
    }
}

impl LocalLine for CommandeExterneLocal {
    fn local_id(&self) -> i64 {
        self.local_id
    }
}

/// Order aggregate: parent fields plus both owned child collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F::LigneArticle: Serialize, F::LigneLocal: Serialize",
    deserialize = "F::LigneArticle: Deserialize<'de>, F::LigneLocal: Deserialize<'de>"
))]
pub struct Commande<F: OrderFamily> {
    /// Store-assigned identity; `None` until first insert
    pub id: Option<i64>,
    pub statut: StatutCommande,
    pub magasinier_id: i64,
    /// Consumer id for internal orders, supplier id for external orders
    pub contrepartie_id: i64,
    pub local_id: i64,
    /// Set by the store on insert, never changed afterwards
    pub creer_a: Option<DateTime<Utc>>,
    /// Business-level confirmation, only ever set by the caller
    pub confirmer_a: Option<DateTime<Utc>>,
    /// Set by the store on every successful update
    pub mise_a_jour_a: Option<DateTime<Utc>>,
    pub articles: Vec<F::LigneArticle>,
    pub locaux: Vec<F::LigneLocal>,
}

pub type CommandeInterne = Commande<Interne>;
pub type CommandeExterne = Commande<Externe>;

impl<F: OrderFamily> Commande<F> {
    /// Fresh, unpersisted order with no children and status "En attente"
    pub fn new(magasinier_id: i64, contrepartie_id: i64, local_id: i64) -> Self {
        Self {
            id: None,
            statut: StatutCommande::default(),
            magasinier_id,
            contrepartie_id,
            local_id,
            creer_a: None,
            confirmer_a: None,
            mise_a_jour_a: None,
            articles: Vec::new(),
            locaux: Vec::new(),
        }
    }

    pub fn famille(&self) -> &'static str {
        F::NAME
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn ajouter_article(&mut self, ligne: F::LigneArticle) {
        self.articles.push(ligne);
    }

    pub fn ajouter_local(&mut self, ligne: F::LigneLocal) {
        self.locaux.push(ligne);
    }

    /// Remove the persisted article line with the given row id
    ///
    /// Returns the removed line, `None` if no line carries that id.
    pub fn retirer_article(&mut self, row_id: i64) -> Option<F::LigneArticle> {
        let pos = self
            .articles
            .iter()
            .position(|l| l.row_id() == Some(row_id))?;
        Some(self.articles.remove(pos))
    }

    pub fn retirer_local(&mut self, row_id: i64) -> Option<F::LigneLocal> {
        let pos = self.locaux.iter().position(|l| l.row_id() == Some(row_id))?;
        Some(self.locaux.remove(pos))
    }

    pub fn article_mut(&mut self, row_id: i64) -> Option<&mut F::LigneArticle> {
        self.articles
            .iter_mut()
            .find(|l| l.row_id() == Some(row_id))
    }

    pub fn local_mut(&mut self, row_id: i64) -> Option<&mut F::LigneLocal> {
        self.locaux.iter_mut().find(|l| l.row_id() == Some(row_id))
    }

    /// Record a business confirmation; persisted by the next update
    pub fn confirmer(&mut self, at: DateTime<Utc>) {
        self.confirmer_a = Some(at);
    }

    /// Sum of line quantities, `None` on overflow
    pub fn quantite_totale(&self) -> Option<i64> {
        self.articles
            .iter()
            .try_fold(0i64, |total, ligne| total.checked_add(ligne.quantite()))
    }
}

impl Commande<Interne> {
    pub fn consommateur_id(&self) -> i64 {
        self.contrepartie_id
    }
}

impl Commande<Externe> {
    pub fn fournisseur_id(&self) -> i64 {
        self.contrepartie_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted_line(row_id: i64, article_id: i64, quantite: i64) -> CommandeInterneArticle {
        let mut line = CommandeInterneArticle::new(article_id, quantite);
        line.attach(row_id, 1);
        line
    }

    #[test]
    fn test_new_commande_is_unpersisted() {
        let cmd = CommandeInterne::new(1, 2, 3);

        assert!(!cmd.is_persisted());
        assert_eq!(cmd.statut, StatutCommande::EnAttente);
        assert_eq!(cmd.consommateur_id(), 2);
        assert_eq!(cmd.famille(), "interne");
        assert!(cmd.creer_a.is_none());
    }

    #[test]
    fn test_attach_sets_row_and_parent_ids() {
        let mut line = CommandeExterneLocal::new(4);
        assert_eq!(line.row_id(), None);

        line.attach(10, 3);

        assert_eq!(line.row_id(), Some(10));
        assert_eq!(line.commande_id(), Some(3));
    }

    #[test]
    fn test_retirer_article_by_row_id() {
        let mut cmd = CommandeInterne::new(1, 1, 1);
        cmd.ajouter_article(persisted_line(5, 100, 2));
        cmd.ajouter_article(persisted_line(6, 101, 3));
        cmd.ajouter_article(CommandeInterneArticle::new(102, 1));

        let removed = cmd.retirer_article(5).expect("line 5 exists");

        assert_eq!(removed.article_id, 100);
        assert_eq!(cmd.articles.len(), 2);
        assert!(cmd.retirer_article(5).is_none());
    }

    #[test]
    fn test_article_mut_and_total() {
        let mut cmd = CommandeInterne::new(1, 1, 1);
        cmd.ajouter_article(persisted_line(5, 100, 2));
        cmd.ajouter_article(persisted_line(6, 101, 3));

        cmd.article_mut(6).expect("line 6 exists").quantite = 10;

        assert_eq!(cmd.quantite_totale(), Some(12));
    }

    #[test]
    fn test_total_overflow_is_none() {
        let mut cmd = CommandeInterne::new(1, 1, 1);
        cmd.ajouter_article(persisted_line(5, 100, i64::MAX));
        cmd.ajouter_article(persisted_line(6, 101, i64::MAX));

        assert_eq!(cmd.quantite_totale(), None);
    }

    #[test]
    fn test_serialization_round_trips_children() {
        let mut cmd = CommandeExterne::new(1, 7, 2);
        cmd.ajouter_article(CommandeExterneArticle::new(3, 4));
        cmd.ajouter_local(CommandeExterneLocal::new(2));

        let json = serde_json::to_string(&cmd).unwrap();
        let back: CommandeExterne = serde_json::from_str(&json).unwrap();

        assert_eq!(back, cmd);
        assert_eq!(back.fournisseur_id(), 7);
    }
}
