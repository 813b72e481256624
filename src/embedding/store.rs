use candle_core::{Device, Module, Result, Tensor};
use candle_nn::Embedding;

/// One of the four learned lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    UserGmf,
    ItemGmf,
    UserMlp,
    ItemMlp,
}

impl Branch {
    /// All tables, in checkpoint order.
    pub const ALL: [Branch; 4] = [
        Branch::UserGmf,
        Branch::ItemGmf,
        Branch::UserMlp,
        Branch::ItemMlp,
    ];

    /// Tensor name of this table inside a checkpoint.
    pub fn tensor_name(&self) -> &'static str {
        match self {
            Branch::UserGmf => crate::constants::USER_GMF_TENSOR,
            Branch::ItemGmf => crate::constants::ITEM_GMF_TENSOR,
            Branch::UserMlp => crate::constants::USER_MLP_TENSOR,
            Branch::ItemMlp => crate::constants::ITEM_MLP_TENSOR,
        }
    }

    /// Returns `true` for tables keyed by user index.
    pub fn is_user(&self) -> bool {
        matches!(self, Branch::UserGmf | Branch::UserMlp)
    }

    /// Returns `true` for the GMF branch tables.
    pub fn is_gmf(&self) -> bool {
        matches!(self, Branch::UserGmf | Branch::ItemGmf)
    }
}

/// User and item embedding tables for both NeuMF branches.
///
/// Pure data: shapes are checked once when the model context is loaded, so lookups
/// only carry a debug assertion on the index.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    user_gmf: Embedding,
    item_gmf: Embedding,
    user_mlp: Embedding,
    item_mlp: Embedding,
    n_users: usize,
    n_items: usize,
    gmf_dim: usize,
    mlp_dim: usize,
}

impl EmbeddingStore {
    /// Wraps four `[rows, dim]` tables.
    pub fn new(
        user_gmf: Tensor,
        item_gmf: Tensor,
        user_mlp: Tensor,
        item_mlp: Tensor,
    ) -> Result<Self> {
        let (n_users, gmf_dim) = user_gmf.dims2()?;
        let (n_items, _) = item_gmf.dims2()?;
        let (_, mlp_dim) = user_mlp.dims2()?;

        Ok(Self {
            user_gmf: Embedding::new(user_gmf, gmf_dim),
            item_gmf: Embedding::new(item_gmf, gmf_dim),
            user_mlp: Embedding::new(user_mlp, mlp_dim),
            item_mlp: Embedding::new(item_mlp, mlp_dim),
            n_users,
            n_items,
            gmf_dim,
            mlp_dim,
        })
    }

    pub fn n_users(&self) -> usize {
        self.n_users
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// GMF embedding width (`eg`).
    pub fn gmf_dim(&self) -> usize {
        self.gmf_dim
    }

    /// MLP embedding width (`em`).
    pub fn mlp_dim(&self) -> usize {
        self.mlp_dim
    }

    pub fn device(&self) -> &Device {
        self.user_gmf.embeddings().device()
    }

    /// Number of rows in a table.
    pub fn table_len(&self, branch: Branch) -> usize {
        if branch.is_user() {
            self.n_users
        } else {
            self.n_items
        }
    }

    /// Width of a table.
    pub fn dim(&self, branch: Branch) -> usize {
        if branch.is_gmf() {
            self.gmf_dim
        } else {
            self.mlp_dim
        }
    }

    /// Copies one embedding vector out of a table.
    pub fn lookup(&self, branch: Branch, index: usize) -> Result<Vec<f32>> {
        self.row(branch, index)?.squeeze(0)?.to_vec1::<f32>()
    }

    /// Returns one embedding as a `[1, dim]` view, ready for broadcasting.
    pub fn row(&self, branch: Branch, index: usize) -> Result<Tensor> {
        debug_assert!(
            index < self.table_len(branch),
            "{branch:?} index {index} out of range ({})",
            self.table_len(branch)
        );
        self.table(branch).embeddings().narrow(0, index, 1)
    }

    /// Gathers the rows named by a `u32` index tensor into `[len, dim]`.
    pub fn rows(&self, branch: Branch, indices: &Tensor) -> Result<Tensor> {
        self.table(branch).forward(indices)
    }

    fn table(&self, branch: Branch) -> &Embedding {
        match branch {
            Branch::UserGmf => &self.user_gmf,
            Branch::ItemGmf => &self.item_gmf,
            Branch::UserMlp => &self.user_mlp,
            Branch::ItemMlp => &self.item_mlp,
        }
    }
}
