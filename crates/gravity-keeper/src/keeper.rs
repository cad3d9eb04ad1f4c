use gravity_state::{BankStore, DistributionStore, GravityStore, StakingStore};

/// The gravity keeper: the module's own store plus the three collaborators
/// it borrows behaviour from. Handlers live in `unhalt` and `airdrop`, each
/// bounded only by the collaborator traits it actually calls.
pub struct Keeper<S, B, D> {
    pub store: GravityStore,
    pub staking: S,
    pub bank: B,
    pub distribution: D,
}

/// Keeper wired to the sled-backed collaborator stores.
pub type StoreKeeper = Keeper<StakingStore, BankStore, DistributionStore>;

impl<S, B, D> Keeper<S, B, D> {
    pub fn new(staking: S, bank: B, distribution: D) -> Self {
        Self {
            store: GravityStore::new(),
            staking,
            bank,
            distribution,
        }
    }
}

impl Default for StoreKeeper {
    fn default() -> Self {
        Keeper::new(StakingStore::new(), BankStore::new(), DistributionStore::new())
    }
}
