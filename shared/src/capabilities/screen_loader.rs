use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::router::Screen;

/// Asks the shell to fetch the code for a screen. Completion order does not
/// matter to the core: the view is always derived from the current route.
#[derive(Clone)]
pub struct ScreenLoader<E> {
    context: CapabilityContext<ScreenLoadOperation, E>,
}

impl<Ev> Capability<Ev> for ScreenLoader<Ev> {
    type Operation = ScreenLoadOperation;
    type MappedSelf<MappedEv> = ScreenLoader<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        ScreenLoader::new(self.context.map_event(f))
    }
}

impl<E> ScreenLoader<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<ScreenLoadOperation, E>) -> Self {
        Self { context }
    }

    pub fn load<F>(&self, screen: Screen, make_event: F)
    where
        F: FnOnce(ScreenLoadResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(ScreenLoadOperation::Load {
                    screen,
                    bundle: screen.bundle().to_string(),
                })
                .await;
            ctx.update_app(make_event(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScreenLoadOperation {
    Load { screen: Screen, bundle: String },
}

impl Operation for ScreenLoadOperation {
    type Output = ScreenLoadResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScreenLoadError {
    #[error("screen bundle not found: {bundle}")]
    NotFound { bundle: String },

    #[error("network error while loading screen: {message}")]
    Network { message: String },

    #[error("screen bundle failed to initialise: {message}")]
    Evaluation { message: String },
}

pub type ScreenLoadResult = Result<(), ScreenLoadError>;
