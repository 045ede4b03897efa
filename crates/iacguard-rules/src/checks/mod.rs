use crate::catalog::RuleCatalog;

#[cfg(feature = "appservice")]
pub mod appservice;
#[cfg(feature = "keyvault")]
pub mod keyvault;
#[cfg(feature = "network")]
pub mod network;
#[cfg(feature = "storage")]
pub mod storage;
#[cfg(feature = "network")]
mod utils;


/// Register every builtin rule compiled into this build, service by service.
#[allow(unused_variables)]
pub fn register_builtin(catalog: &mut RuleCatalog) {
    #[cfg(feature = "storage")]
    storage::register(catalog);
    #[cfg(feature = "keyvault")]
    keyvault::register(catalog);
    #[cfg(feature = "network")]
    network::register(catalog);
    #[cfg(feature = "appservice")]
    appservice::register(catalog);
}
