pub mod error_page;
pub mod home;

use lumen_client::ApiClient;
use lumen_kernel::PageRegistry;

/// Register every UI page with the registry.
pub fn register_all(registry: &mut PageRegistry, api: ApiClient) {
    registry.register(home::create_page(api));
    registry.register(error_page::create_page());
}
