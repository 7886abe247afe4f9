use crate::{
    CancellationToken, DispatchError, MediatorError, Notification, NotificationHandler, Request,
    RequestHandler, Validator,
};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

type Erased = Box<dyn Any + Send + Sync>;

struct Pipeline<R: Request> {
    handler: Option<Arc<dyn RequestHandler<R>>>,
    validator: Option<Validator<R>>,
}

impl<R: Request> Default for Pipeline<R> {
    fn default() -> Self {
        Self {
            handler: None,
            validator: None,
        }
    }
}

struct Subscribers<N: Notification> {
    handlers: Vec<Arc<dyn NotificationHandler<N>>>,
}

#[derive(Default)]
struct Registration {
    name: &'static str,
    handler: bool,
    validator: bool,
}

fn pipeline_mut<R: Request>(pipelines: &mut HashMap<TypeId, Erased>) -> Option<&mut Pipeline<R>> {
    pipelines
        .entry(TypeId::of::<R>())
        .or_insert_with(|| Box::new(Pipeline::<R>::default()))
        .downcast_mut::<Pipeline<R>>()
}

/// Collects registrations; [`build`](Self::build) validates the wiring.
#[derive(Default)]
pub struct MediatorBuilder {
    pipelines: HashMap<TypeId, Erased>,
    subscribers: HashMap<TypeId, Erased>,
    registrations: HashMap<TypeId, Registration>,
    errors: Vec<MediatorError>,
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the one handler for `R`.
    pub fn handler<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R>,
    {
        let registration = self.registration::<R>();
        if registration.handler {
            self.errors.push(MediatorError::DuplicateHandler(R::NAME));
            return self;
        }
        registration.handler = true;

        if let Some(pipeline) = pipeline_mut::<R>(&mut self.pipelines) {
            pipeline.handler = Some(Arc::new(handler));
        }
        self
    }

    /// Registers the rules run before `R`'s handler.
    pub fn validator<R: Request>(mut self, validator: Validator<R>) -> Self {
        let registration = self.registration::<R>();
        if registration.validator {
            self.errors.push(MediatorError::DuplicateValidator(R::NAME));
            return self;
        }
        registration.validator = true;

        if let Some(pipeline) = pipeline_mut::<R>(&mut self.pipelines) {
            pipeline.validator = Some(validator);
        }
        self
    }

    /// Adds a handler for `N`. Handlers run in registration order.
    pub fn notification_handler<N, H>(mut self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        let subscribers = self
            .subscribers
            .entry(TypeId::of::<N>())
            .or_insert_with(|| Box::new(Subscribers::<N> { handlers: Vec::new() }));

        if let Some(subscribers) = subscribers.downcast_mut::<Subscribers<N>>() {
            subscribers.handlers.push(Arc::new(handler));
        }
        self
    }

    fn registration<R: Request>(&mut self) -> &mut Registration {
        self.registrations
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Registration {
                name: R::NAME,
                ..Registration::default()
            })
    }

    /// Fails on the first wiring mistake found.
    pub fn build(self) -> Result<Mediator, MediatorError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        if let Some(orphan) = self
            .registrations
            .values()
            .find(|registration| registration.validator && !registration.handler)
        {
            return Err(MediatorError::ValidatorWithoutHandler(orphan.name));
        }

        tracing::info!(
            requests = self.registrations.len(),
            notifications = self.subscribers.len(),
            "Mediator built"
        );

        Ok(Mediator {
            pipelines: self.pipelines,
            subscribers: self.subscribers,
        })
    }
}

/// Routes requests to their handler and notifications to their subscribers.
pub struct Mediator {
    pipelines: HashMap<TypeId, Erased>,
    subscribers: HashMap<TypeId, Erased>,
}

impl Mediator {
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    /// Whether a handler is registered for `R`.
    pub fn handles<R: Request>(&self) -> bool {
        self.pipeline::<R>().is_some()
    }

    fn pipeline<R: Request>(&self) -> Option<(&Arc<dyn RequestHandler<R>>, Option<&Validator<R>>)> {
        let pipeline = self
            .pipelines
            .get(&TypeId::of::<R>())?
            .downcast_ref::<Pipeline<R>>()?;
        let handler = pipeline.handler.as_ref()?;
        Some((handler, pipeline.validator.as_ref()))
    }

    /// Validates `request`, then hands it to its handler.
    pub async fn send<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response, R::Error> {
        let Some((handler, validator)) = self.pipeline::<R>() else {
            tracing::error!(request = R::NAME, "No handler registered, check mediator wiring");
            return Err(DispatchError::NoHandler(R::NAME).into());
        };

        if let Some(validator) = validator {
            if let Err(errors) = validator.validate(&request) {
                tracing::debug!(request = R::NAME, "Validation failed: {}", errors);
                return Err(errors.into());
            }
        }

        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled(R::NAME).into());
        }

        let span = tracing::debug_span!("request", name = R::NAME);
        async move {
            let started = Instant::now();
            tracing::debug!("Started");
            let result = handler.handle(request, cancel).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => tracing::debug!(elapsed_ms, "Completed"),
                Err(_) => tracing::debug!(elapsed_ms, "Failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Runs every handler subscribed to `N`, stopping at the first error.
    pub async fn publish<N: Notification>(
        &self,
        notification: &N,
        cancel: &CancellationToken,
    ) -> Result<(), N::Error> {
        let Some(subscribers) = self
            .subscribers
            .get(&TypeId::of::<N>())
            .and_then(|s| s.downcast_ref::<Subscribers<N>>())
        else {
            tracing::trace!(notification = N::NAME, "No subscribers");
            return Ok(());
        };

        for handler in &subscribers.handlers {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled(N::NAME).into());
            }
            handler.handle(notification, cancel).await?;
        }

        tracing::debug!(
            notification = N::NAME,
            handlers = subscribers.handlers.len(),
            "Published"
        );
        Ok(())
    }
}
