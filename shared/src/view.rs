use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::session::AccountRole;

/// Role-segmented groups of views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewNamespace {
    Auth,
    Public,
    Buyer,
    Vendor,
    Support,
    Admin,
}

impl ViewNamespace {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Public => "public",
            Self::Buyer => "buyer",
            Self::Vendor => "vendor",
            Self::Support => "support",
            Self::Admin => "admin",
        }
    }

    /// Role a signed-in user is expected to hold for this namespace.
    ///
    /// Informational only: access control belongs to the backend.
    #[must_use]
    pub const fn required_role(self) -> Option<AccountRole> {
        match self {
            Self::Auth | Self::Public => None,
            Self::Buyer => Some(AccountRole::Buyer),
            Self::Vendor => Some(AccountRole::Vendor),
            Self::Support => Some(AccountRole::Support),
            Self::Admin => Some(AccountRole::Admin),
        }
    }
}

/// Every navigable view of the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    // Auth
    Login,
    StaffLogin,
    RegisterBuyer,
    RegisterVendor,
    ForgotPassword,
    ResetPassword,
    VerifyEmail,
    VendorOnboarding,

    // Public
    #[default]
    Home,
    Catalog,
    ProductDetail,
    VendorStorefront,
    Search,
    About,
    Contact,
    Faq,
    Terms,
    Privacy,

    // Buyer
    Cart,
    Checkout,
    OrderConfirmation,
    BuyerDashboard,
    BuyerOrders,
    BuyerOrderDetail,
    Wishlist,
    BuyerProfile,
    BuyerDisputes,
    OpenDispute,

    // Vendor
    VendorDashboard,
    VendorProducts,
    VendorAddProduct,
    VendorEditProduct,
    VendorOrders,
    VendorOrderDetail,
    VendorKyc,
    VendorProfile,
    VendorPayouts,
    VendorReviews,

    // Support
    SupportDashboard,
    SupportTickets,
    SupportTicketDetail,
    SupportDisputes,
    SupportDisputeDetail,

    // Admin
    AdminDashboard,
    AdminUsers,
    AdminUserDetail,
    AdminVendors,
    AdminKycReview,
    AdminProducts,
    AdminOrders,
    AdminHomepageEditor,
    AdminCategories,
    AdminSettings,
}

impl View {
    pub const ALL: &'static [View] = &[
        Self::Login,
        Self::StaffLogin,
        Self::RegisterBuyer,
        Self::RegisterVendor,
        Self::ForgotPassword,
        Self::ResetPassword,
        Self::VerifyEmail,
        Self::VendorOnboarding,
        Self::Home,
        Self::Catalog,
        Self::ProductDetail,
        Self::VendorStorefront,
        Self::Search,
        Self::About,
        Self::Contact,
        Self::Faq,
        Self::Terms,
        Self::Privacy,
        Self::Cart,
        Self::Checkout,
        Self::OrderConfirmation,
        Self::BuyerDashboard,
        Self::BuyerOrders,
        Self::BuyerOrderDetail,
        Self::Wishlist,
        Self::BuyerProfile,
        Self::BuyerDisputes,
        Self::OpenDispute,
        Self::VendorDashboard,
        Self::VendorProducts,
        Self::VendorAddProduct,
        Self::VendorEditProduct,
        Self::VendorOrders,
        Self::VendorOrderDetail,
        Self::VendorKyc,
        Self::VendorProfile,
        Self::VendorPayouts,
        Self::VendorReviews,
        Self::SupportDashboard,
        Self::SupportTickets,
        Self::SupportTicketDetail,
        Self::SupportDisputes,
        Self::SupportDisputeDetail,
        Self::AdminDashboard,
        Self::AdminUsers,
        Self::AdminUserDetail,
        Self::AdminVendors,
        Self::AdminKycReview,
        Self::AdminProducts,
        Self::AdminOrders,
        Self::AdminHomepageEditor,
        Self::AdminCategories,
        Self::AdminSettings,
    ];

    #[must_use]
    pub const fn as_path(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::StaffLogin => "staff-login",
            Self::RegisterBuyer => "register-buyer",
            Self::RegisterVendor => "register-vendor",
            Self::ForgotPassword => "forgot-password",
            Self::ResetPassword => "reset-password",
            Self::VerifyEmail => "verify-email",
            Self::VendorOnboarding => "vendor-onboarding",
            Self::Home => "home",
            Self::Catalog => "catalog",
            Self::ProductDetail => "product-detail",
            Self::VendorStorefront => "vendor-storefront",
            Self::Search => "search",
            Self::About => "about",
            Self::Contact => "contact",
            Self::Faq => "faq",
            Self::Terms => "terms",
            Self::Privacy => "privacy",
            Self::Cart => "cart",
            Self::Checkout => "checkout",
            Self::OrderConfirmation => "order-confirmation",
            Self::BuyerDashboard => "buyer-dashboard",
            Self::BuyerOrders => "buyer-orders",
            Self::BuyerOrderDetail => "buyer-order-detail",
            Self::Wishlist => "wishlist",
            Self::BuyerProfile => "buyer-profile",
            Self::BuyerDisputes => "buyer-disputes",
            Self::OpenDispute => "open-dispute",
            Self::VendorDashboard => "vendor-dashboard",
            Self::VendorProducts => "vendor-products",
            Self::VendorAddProduct => "vendor-add-product",
            Self::VendorEditProduct => "vendor-edit-product",
            Self::VendorOrders => "vendor-orders",
            Self::VendorOrderDetail => "vendor-order-detail",
            Self::VendorKyc => "vendor-kyc",
            Self::VendorProfile => "vendor-profile",
            Self::VendorPayouts => "vendor-payouts",
            Self::VendorReviews => "vendor-reviews",
            Self::SupportDashboard => "support-dashboard",
            Self::SupportTickets => "support-tickets",
            Self::SupportTicketDetail => "support-ticket-detail",
            Self::SupportDisputes => "support-disputes",
            Self::SupportDisputeDetail => "support-dispute-detail",
            Self::AdminDashboard => "admin-dashboard",
            Self::AdminUsers => "admin-users",
            Self::AdminUserDetail => "admin-user-detail",
            Self::AdminVendors => "admin-vendors",
            Self::AdminKycReview => "admin-kyc-review",
            Self::AdminProducts => "admin-products",
            Self::AdminOrders => "admin-orders",
            Self::AdminHomepageEditor => "admin-homepage-editor",
            Self::AdminCategories => "admin-categories",
            Self::AdminSettings => "admin-settings",
        }
    }

    /// Parses an identifier coming from outside the core (deep link,
    /// restored state). Leading/trailing slashes and case are ignored.
    #[must_use]
    pub fn from_path(raw: &str) -> Option<Self> {
        let needle = raw.trim().trim_matches('/');
        Self::ALL
            .iter()
            .copied()
            .find(|view| view.as_path().eq_ignore_ascii_case(needle))
    }

    #[must_use]
    pub const fn namespace(self) -> ViewNamespace {
        match self {
            Self::Login
            | Self::StaffLogin
            | Self::RegisterBuyer
            | Self::RegisterVendor
            | Self::ForgotPassword
            | Self::ResetPassword
            | Self::VerifyEmail
            | Self::VendorOnboarding => ViewNamespace::Auth,

            Self::Home
            | Self::Catalog
            | Self::ProductDetail
            | Self::VendorStorefront
            | Self::Search
            | Self::About
            | Self::Contact
            | Self::Faq
            | Self::Terms
            | Self::Privacy => ViewNamespace::Public,

            Self::Cart
            | Self::Checkout
            | Self::OrderConfirmation
            | Self::BuyerDashboard
            | Self::BuyerOrders
            | Self::BuyerOrderDetail
            | Self::Wishlist
            | Self::BuyerProfile
            | Self::BuyerDisputes
            | Self::OpenDispute => ViewNamespace::Buyer,

            Self::VendorDashboard
            | Self::VendorProducts
            | Self::VendorAddProduct
            | Self::VendorEditProduct
            | Self::VendorOrders
            | Self::VendorOrderDetail
            | Self::VendorKyc
            | Self::VendorProfile
            | Self::VendorPayouts
            | Self::VendorReviews => ViewNamespace::Vendor,

            Self::SupportDashboard
            | Self::SupportTickets
            | Self::SupportTicketDetail
            | Self::SupportDisputes
            | Self::SupportDisputeDetail => ViewNamespace::Support,

            Self::AdminDashboard
            | Self::AdminUsers
            | Self::AdminUserDetail
            | Self::AdminVendors
            | Self::AdminKycReview
            | Self::AdminProducts
            | Self::AdminOrders
            | Self::AdminHomepageEditor
            | Self::AdminCategories
            | Self::AdminSettings => ViewNamespace::Admin,
        }
    }

    /// The registration screen is shared between buyers and vendors; it reads
    /// the account type from here.
    #[must_use]
    pub const fn registration_role(self) -> Option<AccountRole> {
        match self {
            Self::RegisterBuyer => Some(AccountRole::Buyer),
            Self::RegisterVendor => Some(AccountRole::Vendor),
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view: {0}")]
pub struct UnknownView(pub String);

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_path(s).ok_or_else(|| UnknownView(s.to_string()))
    }
}

/// The current-view slot. Values that do not belong to the closed set keep
/// their raw text so the fallback screen can show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Route {
    Known(View),
    Unrecognized(String),
}

impl Default for Route {
    fn default() -> Self {
        Self::Known(View::default())
    }
}

impl Route {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match View::from_path(raw) {
            Some(view) => Self::Known(view),
            None => Self::Unrecognized(raw.to_string()),
        }
    }

    #[must_use]
    pub const fn view(&self) -> Option<View> {
        match self {
            Self::Known(view) => Some(*view),
            Self::Unrecognized(_) => None,
        }
    }

    #[must_use]
    pub fn as_path(&self) -> &str {
        match self {
            Self::Known(view) => view.as_path(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<View> for Route {
    fn from(view: View) -> Self {
        Self::Known(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_lists_every_view_once() {
        let unique: HashSet<_> = View::ALL.iter().collect();
        assert_eq!(unique.len(), View::ALL.len());
        assert_eq!(View::ALL.len(), 53);
    }

    #[test]
    fn default_route_is_home() {
        assert_eq!(View::default(), View::Home);
        assert_eq!(Route::default(), Route::Known(View::Home));
    }

    #[test]
    fn paths_are_unique_and_parse_back() {
        let paths: HashSet<_> = View::ALL.iter().map(|v| v.as_path()).collect();
        assert_eq!(paths.len(), View::ALL.len());

        for view in View::ALL {
            assert_eq!(View::from_path(view.as_path()), Some(*view));
        }
    }

    #[test]
    fn from_path_ignores_slashes_and_case() {
        assert_eq!(View::from_path("/vendor-kyc/"), Some(View::VendorKyc));
        assert_eq!(View::from_path("  Admin-Settings "), Some(View::AdminSettings));
        assert_eq!(View::from_path("nope"), None);
        assert_eq!(View::from_path(""), None);
    }

    #[test]
    fn from_str_reports_unknown() {
        assert_eq!("cart".parse::<View>(), Ok(View::Cart));
        assert_eq!(
            "warehouse".parse::<View>(),
            Err(UnknownView("warehouse".into()))
        );
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&View::AdminHomepageEditor).unwrap();
        assert_eq!(json, "\"admin-homepage-editor\"");
        let back: View = serde_json::from_str("\"buyer-order-detail\"").unwrap();
        assert_eq!(back, View::BuyerOrderDetail);
    }

    #[test]
    fn namespaces_cover_roles() {
        assert_eq!(View::Login.namespace(), ViewNamespace::Auth);
        assert_eq!(View::Catalog.namespace(), ViewNamespace::Public);
        assert_eq!(View::Checkout.namespace(), ViewNamespace::Buyer);
        assert_eq!(View::VendorKyc.namespace(), ViewNamespace::Vendor);
        assert_eq!(View::SupportTickets.namespace(), ViewNamespace::Support);
        assert_eq!(View::AdminKycReview.namespace(), ViewNamespace::Admin);

        assert_eq!(ViewNamespace::Public.required_role(), None);
        assert_eq!(
            ViewNamespace::Vendor.required_role(),
            Some(AccountRole::Vendor)
        );
    }

    #[test]
    fn registration_role_only_for_register_views() {
        assert_eq!(
            View::RegisterBuyer.registration_role(),
            Some(AccountRole::Buyer)
        );
        assert_eq!(
            View::RegisterVendor.registration_role(),
            Some(AccountRole::Vendor)
        );
        assert_eq!(View::Login.registration_role(), None);
    }

    #[test]
    fn route_parse_keeps_raw_text_for_unknown_values() {
        assert_eq!(Route::parse("wishlist"), Route::Known(View::Wishlist));
        let route = Route::parse("legacy-promo");
        assert_eq!(route, Route::Unrecognized("legacy-promo".into()));
        assert_eq!(route.view(), None);
        assert_eq!(route.as_path(), "legacy-promo");
    }
}
