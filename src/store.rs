use crate::error::Result;
use crate::models::{Category, NewTransaction, Transaction};

/// Storage operations the import pipeline depends on.
///
/// The pipeline receives an implementation as an argument; it never reaches
/// for a connection itself. `create_*` builds unsaved records in memory,
/// `save_*` persists a whole batch in one round trip and assigns ids in
/// place.
pub trait TransactionStore {
    /// Fetch every stored category whose title is in `titles`, in a single
    /// membership query.
    fn find_categories_by_titles(&self, titles: &[String]) -> Result<Vec<Category>>;

    fn create_categories(&self, titles: &[String]) -> Vec<Category>;

    fn save_categories(&self, categories: &mut [Category]) -> Result<()>;

    fn create_transactions(&self, inputs: &[NewTransaction]) -> Vec<Transaction>;

    fn save_transactions(&self, transactions: &mut [Transaction]) -> Result<()>;
}
