// TabKeeper state managers
// Managers own the mutable side: the reconciled snapshot and the commands that change the tab source.

pub mod snapshot_store;
pub mod tab_actions;
