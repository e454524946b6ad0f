use serde::{Deserialize, Serialize};

pub const SHOP_DOMAIN_SUFFIX: &str = ".myshopify.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub shop: String,
    pub scopes: Vec<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            shop: String::new(),
            scopes: default_scopes(),
        }
    }
}

impl OAuthConfig {
    pub fn scopes_joined(&self) -> String {
        self.scopes.join(",")
    }

    pub fn set_scopes(&mut self, scopes: impl IntoIterator<Item = String>) {
        self.scopes = dedupe_scopes(scopes);
    }
}

/// Granted token as returned by `/admin/oauth/access_token`. Offline tokens
/// never expire, so there is no refresh token to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub shop: Option<String>,
}

pub fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// Parses a comma separated scope list, keeping first occurrences in order.
pub fn scopes_from_str(input: &str) -> Vec<String> {
    dedupe_scopes(input.split(',').map(|s| s.trim().to_string()))
}

fn dedupe_scopes(scopes: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for scope in scopes {
        let scope = scope.trim();
        if scope.is_empty() || out.iter().any(|s| s == scope) {
            continue;
        }
        out.push(scope.to_string());
    }
    out
}

pub const DEFAULT_SCOPES: &[&str] = &[
    "read_all_orders",
    "read_analytics",
    "read_app_proxy",
    "write_app_proxy",
    "read_apps",
    "read_assigned_fulfillment_orders",
    "write_assigned_fulfillment_orders",
    "read_audit_events",
    "read_customer_events",
    "read_cart_transforms",
    "write_cart_transforms",
    "read_all_cart_transforms",
    "read_validations",
    "write_validations",
    "read_cash_tracking",
    "read_channels",
    "write_channels",
    "read_checkout_branding_settings",
    "write_checkout_branding_settings",
    "write_checkouts",
    "read_checkouts",
    "read_companies",
    "write_companies",
    "read_custom_fulfillment_services",
    "write_custom_fulfillment_services",
    "read_custom_pixels",
    "write_custom_pixels",
    "read_customers",
    "write_customers",
    "read_customer_data_erasure",
    "write_customer_data_erasure",
    "read_customer_payment_methods",
    "read_customer_merge",
    "write_customer_merge",
    "read_delivery_customizations",
    "write_delivery_customizations",
    "read_price_rules",
    "write_price_rules",
    "read_discounts",
    "write_discounts",
    "read_discounts_allocator_functions",
    "write_discounts_allocator_functions",
    "read_discovery",
    "write_discovery",
    "write_draft_orders",
    "read_draft_orders",
    "read_files",
    "write_files",
    "read_fulfillment_constraint_rules",
    "write_fulfillment_constraint_rules",
    "read_fulfillments",
    "write_fulfillments",
    "read_gift_card_transactions",
    "write_gift_card_transactions",
    "read_gift_cards",
    "write_gift_cards",
    "write_inventory",
    "read_inventory",
    "write_inventory_shipments",
    "read_inventory_shipments",
    "write_inventory_shipments_received_items",
    "read_inventory_shipments_received_items",
    "write_inventory_transfers",
    "read_inventory_transfers",
    "read_legal_policies",
    "write_legal_policies",
    "read_delivery_option_generators",
    "write_delivery_option_generators",
    "read_locales",
    "write_locales",
    "write_locations",
    "read_locations",
    "read_marketing_integrated_campaigns",
    "write_marketing_integrated_campaigns",
    "write_marketing_events",
    "read_marketing_events",
    "read_markets",
    "write_markets",
    "read_markets_home",
    "write_markets_home",
    "read_merchant_managed_fulfillment_orders",
    "write_merchant_managed_fulfillment_orders",
    "read_metaobject_definitions",
    "write_metaobject_definitions",
    "read_metaobjects",
    "write_metaobjects",
    "read_online_store_navigation",
    "write_online_store_navigation",
    "read_online_store_pages",
    "write_online_store_pages",
    "write_order_edits",
    "read_order_edits",
    "read_orders",
    "write_orders",
    "write_packing_slip_templates",
    "read_packing_slip_templates",
    "write_payment_mandate",
    "read_payment_mandate",
    "read_payment_terms",
    "write_payment_terms",
    "read_payment_customizations",
    "write_payment_customizations",
    "read_pixels",
    "write_pixels",
    "read_privacy_settings",
    "write_privacy_settings",
    "read_product_feeds",
    "write_product_feeds",
    "read_product_listings",
    "write_product_listings",
    "read_products",
    "write_products",
    "read_publications",
    "write_publications",
    "read_purchase_options",
    "write_purchase_options",
    "write_reports",
    "read_reports",
    "read_resource_feedbacks",
    "write_resource_feedbacks",
    "read_returns",
    "write_returns",
    "read_script_tags",
    "write_script_tags",
    "read_shopify_payments_provider_accounts_sensitive",
    "read_shipping",
    "write_shipping",
    "read_shopify_payments_accounts",
    "read_shopify_payments_payouts",
    "read_shopify_payments_bank_accounts",
    "read_shopify_payments_disputes",
    "write_shopify_payments_disputes",
    "read_content",
    "write_content",
    "read_store_credit_account_transactions",
    "write_store_credit_account_transactions",
    "read_store_credit_accounts",
    "write_own_subscription_contracts",
    "read_own_subscription_contracts",
    "write_theme_code",
    "read_themes",
    "write_themes",
    "read_third_party_fulfillment_orders",
    "write_third_party_fulfillment_orders",
    "read_translations",
    "write_translations",
    "customer_read_companies",
    "customer_write_companies",
    "customer_write_customers",
    "customer_read_customers",
    "customer_read_draft_orders",
    "customer_read_markets",
    "customer_read_metaobjects",
    "customer_read_orders",
    "customer_write_orders",
    "customer_read_quick_sale",
    "customer_write_quick_sale",
    "customer_read_store_credit_account_transactions",
    "customer_read_store_credit_accounts",
    "customer_write_own_subscription_contracts",
    "customer_read_own_subscription_contracts",
    "unauthenticated_write_bulk_operations",
    "unauthenticated_read_bulk_operations",
    "unauthenticated_read_bundles",
    "unauthenticated_write_checkouts",
    "unauthenticated_read_checkouts",
    "unauthenticated_write_customers",
    "unauthenticated_read_customers",
    "unauthenticated_read_customer_tags",
    "unauthenticated_read_metaobjects",
    "unauthenticated_read_product_pickup_locations",
    "unauthenticated_read_product_inventory",
    "unauthenticated_read_product_listings",
    "unauthenticated_read_product_tags",
    "unauthenticated_read_selling_plans",
    "unauthenticated_read_shop_pay_installments_pricing",
    "unauthenticated_read_content",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_from_str_trims_and_dedupes_in_order() {
        let scopes = scopes_from_str(" read_orders, write_orders,,read_orders , read_products");
        assert_eq!(scopes, vec!["read_orders", "write_orders", "read_products"]);
    }

    #[test]
    fn default_config_carries_every_default_scope() {
        let config = OAuthConfig::default();
        assert_eq!(config.scopes.len(), DEFAULT_SCOPES.len());
        assert!(config.client_id.is_empty());
        assert!(config.shop.is_empty());
    }

    #[test]
    fn default_scope_list_has_no_duplicates() {
        assert_eq!(dedupe_scopes(default_scopes()).len(), DEFAULT_SCOPES.len());
    }
}
