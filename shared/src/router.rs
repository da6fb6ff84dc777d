use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::view::{Route, View};

/// Identity of a screen component. Shells map each value to one lazily
/// loaded component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    VerifyEmail,
    VendorOnboarding,
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
    VendorDashboard,
    VendorProducts,
    ProductEditor,
    VendorOrders,
    VendorOrderDetail,
    VendorKyc,
    VendorProfile,
    VendorPayouts,
    VendorReviews,
    SupportDashboard,
    SupportTickets,
    SupportTicketDetail,
    SupportDisputes,
    SupportDisputeDetail,
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
    NotFound,
}

impl Screen {
    /// Screens bundled with the shell and never fetched on demand.
    #[must_use]
    pub const fn is_eager(self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Name of the code chunk the shell loads for this screen.
    #[must_use]
    pub const fn bundle(self) -> &'static str {
        match self {
            Self::Login => "auth/login",
            Self::Register => "auth/register",
            Self::ForgotPassword => "auth/forgot-password",
            Self::ResetPassword => "auth/reset-password",
            Self::VerifyEmail => "auth/verify-email",
            Self::VendorOnboarding => "auth/vendor-onboarding",
            Self::Home => "public/home",
            Self::Catalog => "public/catalog",
            Self::ProductDetail => "public/product-detail",
            Self::VendorStorefront => "public/vendor-storefront",
            Self::Search => "public/search",
            Self::About => "public/about",
            Self::Contact => "public/contact",
            Self::Faq => "public/faq",
            Self::Terms => "public/terms",
            Self::Privacy => "public/privacy",
            Self::Cart => "buyer/cart",
            Self::Checkout => "buyer/checkout",
            Self::OrderConfirmation => "buyer/order-confirmation",
            Self::BuyerDashboard => "buyer/dashboard",
            Self::BuyerOrders => "buyer/orders",
            Self::BuyerOrderDetail => "buyer/order-detail",
            Self::Wishlist => "buyer/wishlist",
            Self::BuyerProfile => "buyer/profile",
            Self::BuyerDisputes => "buyer/disputes",
            Self::OpenDispute => "buyer/open-dispute",
            Self::VendorDashboard => "vendor/dashboard",
            Self::VendorProducts => "vendor/products",
            Self::ProductEditor => "vendor/product-editor",
            Self::VendorOrders => "vendor/orders",
            Self::VendorOrderDetail => "vendor/order-detail",
            Self::VendorKyc => "vendor/kyc",
            Self::VendorProfile => "vendor/profile",
            Self::VendorPayouts => "vendor/payouts",
            Self::VendorReviews => "vendor/reviews",
            Self::SupportDashboard => "support/dashboard",
            Self::SupportTickets => "support/tickets",
            Self::SupportTicketDetail => "support/ticket-detail",
            Self::SupportDisputes => "support/disputes",
            Self::SupportDisputeDetail => "support/dispute-detail",
            Self::AdminDashboard => "admin/dashboard",
            Self::AdminUsers => "admin/users",
            Self::AdminUserDetail => "admin/user-detail",
            Self::AdminVendors => "admin/vendors",
            Self::AdminKycReview => "admin/kyc-review",
            Self::AdminProducts => "admin/products",
            Self::AdminOrders => "admin/orders",
            Self::AdminHomepageEditor => "admin/homepage-editor",
            Self::AdminCategories => "admin/categories",
            Self::AdminSettings => "admin/settings",
            Self::NotFound => "core/not-found",
        }
    }
}

/// Views that intentionally render the same screen.
pub const SHARED_SCREENS: &[(Screen, &[View])] = &[
    (Screen::Login, &[View::Login, View::StaffLogin]),
    (Screen::Register, &[View::RegisterBuyer, View::RegisterVendor]),
    (
        Screen::ProductEditor,
        &[View::VendorAddProduct, View::VendorEditProduct],
    ),
];

#[must_use]
pub const fn screen_for(view: View) -> Screen {
    match view {
        View::Login | View::StaffLogin => Screen::Login,
        View::RegisterBuyer | View::RegisterVendor => Screen::Register,
        View::ForgotPassword => Screen::ForgotPassword,
        View::ResetPassword => Screen::ResetPassword,
        View::VerifyEmail => Screen::VerifyEmail,
        View::VendorOnboarding => Screen::VendorOnboarding,
        View::Home => Screen::Home,
        View::Catalog => Screen::Catalog,
        View::ProductDetail => Screen::ProductDetail,
        View::VendorStorefront => Screen::VendorStorefront,
        View::Search => Screen::Search,
        View::About => Screen::About,
        View::Contact => Screen::Contact,
        View::Faq => Screen::Faq,
        View::Terms => Screen::Terms,
        View::Privacy => Screen::Privacy,
        View::Cart => Screen::Cart,
        View::Checkout => Screen::Checkout,
        View::OrderConfirmation => Screen::OrderConfirmation,
        View::BuyerDashboard => Screen::BuyerDashboard,
        View::BuyerOrders => Screen::BuyerOrders,
        View::BuyerOrderDetail => Screen::BuyerOrderDetail,
        View::Wishlist => Screen::Wishlist,
        View::BuyerProfile => Screen::BuyerProfile,
        View::BuyerDisputes => Screen::BuyerDisputes,
        View::OpenDispute => Screen::OpenDispute,
        View::VendorDashboard => Screen::VendorDashboard,
        View::VendorProducts => Screen::VendorProducts,
        View::VendorAddProduct | View::VendorEditProduct => Screen::ProductEditor,
        View::VendorOrders => Screen::VendorOrders,
        View::VendorOrderDetail => Screen::VendorOrderDetail,
        View::VendorKyc => Screen::VendorKyc,
        View::VendorProfile => Screen::VendorProfile,
        View::VendorPayouts => Screen::VendorPayouts,
        View::VendorReviews => Screen::VendorReviews,
        View::SupportDashboard => Screen::SupportDashboard,
        View::SupportTickets => Screen::SupportTickets,
        View::SupportTicketDetail => Screen::SupportTicketDetail,
        View::SupportDisputes => Screen::SupportDisputes,
        View::SupportDisputeDetail => Screen::SupportDisputeDetail,
        View::AdminDashboard => Screen::AdminDashboard,
        View::AdminUsers => Screen::AdminUsers,
        View::AdminUserDetail => Screen::AdminUserDetail,
        View::AdminVendors => Screen::AdminVendors,
        View::AdminKycReview => Screen::AdminKycReview,
        View::AdminProducts => Screen::AdminProducts,
        View::AdminOrders => Screen::AdminOrders,
        View::AdminHomepageEditor => Screen::AdminHomepageEditor,
        View::AdminCategories => Screen::AdminCategories,
        View::AdminSettings => Screen::AdminSettings,
    }
}

/// Never fails: anything outside the closed set lands on `NotFound`.
#[must_use]
pub fn route(route: &Route) -> Screen {
    match route {
        Route::Known(view) => screen_for(*view),
        Route::Unrecognized(_) => Screen::NotFound,
    }
}

/// What the screen region shows for the current route.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenState {
    /// Screen code is being fetched; render the spinner placeholder.
    Loading { screen: Screen },
    Ready {
        screen: Screen,
        /// `None` for the fallback screen.
        view: Option<View>,
        path: String,
    },
    LoadFailed { screen: Screen, message: String },
}

impl ScreenState {
    #[must_use]
    pub const fn screen(&self) -> Screen {
        match self {
            Self::Loading { screen }
            | Self::Ready { screen, .. }
            | Self::LoadFailed { screen, .. } => *screen,
        }
    }
}

/// Tracks which screen chunks are available to render.
#[derive(Debug, Clone, Default)]
pub struct ScreenRegistry {
    loaded: HashSet<Screen>,
    in_flight: HashSet<Screen>,
    /// Last failure per screen, kept until that screen is requested again.
    failed: HashMap<Screen, String>,
}

impl ScreenRegistry {
    #[must_use]
    pub fn is_loaded(&self, screen: Screen) -> bool {
        screen.is_eager() || self.loaded.contains(&screen)
    }

    #[must_use]
    pub fn is_in_flight(&self, screen: Screen) -> bool {
        self.in_flight.contains(&screen)
    }

    /// Returns true when the caller should ask the shell for the chunk.
    /// A previous failure for the same screen is forgotten so the load is
    /// retried.
    pub fn begin_load(&mut self, screen: Screen) -> bool {
        self.failed.remove(&screen);
        if self.is_loaded(screen) || self.in_flight.contains(&screen) {
            return false;
        }
        self.in_flight.insert(screen);
        true
    }

    pub fn mark_loaded(&mut self, screen: Screen) {
        self.in_flight.remove(&screen);
        self.loaded.insert(screen);
        debug!(bundle = screen.bundle(), "screen chunk ready");
    }

    pub fn mark_failed(&mut self, screen: Screen, message: impl Into<String>) {
        self.in_flight.remove(&screen);
        self.failed.insert(screen, message.into());
    }

    #[must_use]
    pub fn failure_for(&self, screen: Screen) -> Option<&str> {
        self.failed.get(&screen).map(String::as_str)
    }

    #[must_use]
    pub fn state_for(&self, current: &Route) -> ScreenState {
        let screen = route(current);
        if let Some(message) = self.failure_for(screen) {
            return ScreenState::LoadFailed {
                screen,
                message: message.to_string(),
            };
        }
        if self.is_loaded(screen) {
            ScreenState::Ready {
                screen,
                view: current.view(),
                path: current.as_path().to_string(),
            }
        } else {
            ScreenState::Loading { screen }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn shared_group(screen: Screen) -> Option<&'static [View]> {
        SHARED_SCREENS
            .iter()
            .find(|(s, _)| *s == screen)
            .map(|(_, views)| *views)
    }

    #[test]
    fn every_view_routes_to_a_real_screen() {
        for view in View::ALL {
            assert_ne!(screen_for(*view), Screen::NotFound, "{view} fell through");
        }
    }

    #[test]
    fn screens_are_distinct_except_documented_groups() {
        let mut by_screen: HashMap<Screen, Vec<View>> = HashMap::new();
        for view in View::ALL {
            by_screen.entry(screen_for(*view)).or_default().push(*view);
        }

        for (screen, views) in by_screen {
            if views.len() > 1 {
                let group = shared_group(screen)
                    .unwrap_or_else(|| panic!("{screen:?} shared by {views:?}"));
                assert_eq!(views.as_slice(), group);
            }
        }
    }

    #[test]
    fn documented_groups_route_together() {
        for (screen, views) in SHARED_SCREENS {
            for view in *views {
                assert_eq!(screen_for(*view), *screen);
            }
        }
    }

    #[test]
    fn unrecognized_route_is_not_found() {
        assert_eq!(
            route(&Route::Unrecognized("flash-sale-2019".into())),
            Screen::NotFound
        );
        assert_eq!(route(&Route::parse("")), Screen::NotFound);
        assert_eq!(route(&Route::Known(View::Cart)), Screen::Cart);
    }

    #[test]
    fn bundles_are_unique() {
        let screens: HashSet<Screen> = View::ALL.iter().map(|v| screen_for(*v)).collect();
        let bundles: HashSet<&str> = screens.iter().map(|s| s.bundle()).collect();
        assert_eq!(bundles.len(), screens.len());
        assert!(!bundles.contains(Screen::NotFound.bundle()));
    }

    #[test]
    fn not_found_never_suspends() {
        let registry = ScreenRegistry::default();
        let state = registry.state_for(&Route::Unrecognized("x".into()));
        assert_eq!(
            state,
            ScreenState::Ready {
                screen: Screen::NotFound,
                view: None,
                path: "x".into(),
            }
        );
    }

    #[test]
    fn registry_loading_lifecycle() {
        let mut registry = ScreenRegistry::default();
        let current = Route::Known(View::Catalog);

        assert!(registry.begin_load(Screen::Catalog));
        assert!(!registry.begin_load(Screen::Catalog), "load already in flight");
        assert_eq!(
            registry.state_for(&current),
            ScreenState::Loading {
                screen: Screen::Catalog
            }
        );

        registry.mark_loaded(Screen::Catalog);
        assert!(!registry.is_in_flight(Screen::Catalog));
        assert!(!registry.begin_load(Screen::Catalog));
        assert_eq!(registry.state_for(&current).screen(), Screen::Catalog);
        assert!(matches!(
            registry.state_for(&current),
            ScreenState::Ready { .. }
        ));
    }

    #[test]
    fn failed_load_is_retried_on_next_begin() {
        let mut registry = ScreenRegistry::default();
        let current = Route::Known(View::VendorKyc);

        registry.begin_load(Screen::VendorKyc);
        registry.mark_failed(Screen::VendorKyc, "chunk 404");
        assert_eq!(
            registry.state_for(&current),
            ScreenState::LoadFailed {
                screen: Screen::VendorKyc,
                message: "chunk 404".into(),
            }
        );

        assert!(registry.begin_load(Screen::VendorKyc));
        assert_eq!(registry.failure_for(Screen::VendorKyc), None);
    }

    #[test]
    fn failure_only_shows_for_its_own_screen() {
        let mut registry = ScreenRegistry::default();
        registry.begin_load(Screen::Cart);
        registry.mark_failed(Screen::Cart, "offline");
        registry.mark_loaded(Screen::Home);

        let state = registry.state_for(&Route::Known(View::Home));
        assert!(matches!(state, ScreenState::Ready { screen: Screen::Home, .. }));
    }

    #[test]
    fn failures_of_different_screens_are_kept_apart() {
        let mut registry = ScreenRegistry::default();
        registry.begin_load(Screen::Catalog);
        registry.begin_load(Screen::Checkout);

        registry.mark_failed(Screen::Checkout, "offline");
        registry.mark_failed(Screen::Catalog, "offline");

        assert_eq!(
            registry.state_for(&Route::Known(View::Checkout)),
            ScreenState::LoadFailed {
                screen: Screen::Checkout,
                message: "offline".into(),
            }
        );
        assert_eq!(registry.failure_for(Screen::Catalog), Some("offline"));

        assert!(registry.begin_load(Screen::Catalog));
        assert_eq!(registry.failure_for(Screen::Catalog), None);
        assert_eq!(registry.failure_for(Screen::Checkout), Some("offline"));
    }
}
