//! Bindings
//!
//! A binding ties a contract to the factory that produces it, together with the
//! lifetime, activation mode and the optional lifecycle views of the produced instance.
//!
//! ```ignore
//! registrar.register(
//!     Binding::singleton::<dyn Clock>(|_| Ok(Arc::new(SystemClock) as Arc<dyn Clock>))
//!         .start_order(-10),
//! )?;
//! ```

use super::resolver::ResolutionContext;
use hearth_domain::constants::DEFAULT_START_ORDER;
use hearth_domain::error::Result;
use hearth_domain::ports::{Component, StartListener};
use hearth_domain::value_objects::erase_instance;
use hearth_domain::{Activation, ContractKey, Instance, Lifetime};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed factory producing the instance of contract `I`
pub type Factory<I> = Arc<dyn Fn(&ResolutionContext<'_>) -> Result<Arc<I>> + Send + Sync>;

type LifecycleView<I> = Arc<dyn Fn(Arc<I>) -> Arc<dyn Component> + Send + Sync>;
type ListenerView<I> = Arc<dyn Fn(Arc<I>) -> Arc<dyn StartListener> + Send + Sync>;

/// Output of a type-erased factory
pub(crate) struct Constructed {
    pub(crate) instance: Instance,
    pub(crate) lifecycle: Option<Arc<dyn Component>>,
    pub(crate) listener: Option<Arc<dyn StartListener>>,
}

pub(crate) type ErasedFactory =
    Arc<dyn Fn(&ResolutionContext<'_>) -> Result<Constructed> + Send + Sync>;

/// A registered binding
#[derive(Clone)]
pub struct Binding {
    pub(crate) key: ContractKey,
    pub(crate) lifetime: Lifetime,
    pub(crate) activation: Option<Activation>,
    pub(crate) start_order: i32,
    pub(crate) sequence: u64,
    pub(crate) group: Option<usize>,
    pub(crate) has_lifecycle: bool,
    pub(crate) has_listener: bool,
    pub(crate) factory: ErasedFactory,
}

impl Binding {
    /// Bind `I` to a factory producing one shared instance
    ///
    /// Singletons are eager unless [`BindingBuilder::lazy`] is called.
    pub fn singleton<I, F>(factory: F) -> BindingBuilder<I>
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolutionContext<'_>) -> Result<Arc<I>> + Send + Sync + 'static,
    {
        BindingBuilder::new(Lifetime::Singleton, Arc::new(factory))
    }

    /// Bind `I` to a factory producing a fresh instance per resolution
    ///
    /// Transients are lazy unless [`BindingBuilder::eager`] is called, in which case
    /// one instance is built and dropped during startup to validate the factory.
    pub fn transient<I, F>(factory: F) -> BindingBuilder<I>
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolutionContext<'_>) -> Result<Arc<I>> + Send + Sync + 'static,
    {
        BindingBuilder::new(Lifetime::Transient, Arc::new(factory))
    }

    /// Bind `I` to an already constructed instance
    pub fn instance<I>(instance: Arc<I>) -> BindingBuilder<I>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        Self::singleton(move |_| Ok(Arc::clone(&instance)))
    }

    /// Contract served by this binding
    pub fn key(&self) -> &ContractKey {
        &self.key
    }

    /// Lifetime of produced instances
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Effective activation mode
    pub fn activation(&self) -> Activation {
        self.activation.unwrap_or(match self.lifetime {
            Lifetime::Singleton => Activation::Eager,
            Lifetime::Transient => Activation::Lazy,
        })
    }

    /// Explicit start order; lower values start first
    pub fn start_order(&self) -> i32 {
        self.start_order
    }

    /// Registration sequence, kept when the binding is replaced
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// True when the instance exposes lifecycle hooks or a start listener
    pub fn has_hooks(&self) -> bool {
        self.has_lifecycle || self.has_listener
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("activation", &self.activation())
            .field("start_order", &self.start_order)
            .field("sequence", &self.sequence)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`Binding::singleton`], [`Binding::transient`] and
/// [`Binding::instance`]
pub struct BindingBuilder<I: ?Sized> {
    key: ContractKey,
    lifetime: Lifetime,
    activation: Option<Activation>,
    start_order: i32,
    factory: Factory<I>,
    lifecycle: Option<LifecycleView<I>>,
    listener: Option<ListenerView<I>>,
    _contract: PhantomData<fn() -> Arc<I>>,
}

impl<I: ?Sized + Send + Sync + 'static> BindingBuilder<I> {
    fn new(lifetime: Lifetime, factory: Factory<I>) -> Self {
        Self {
            key: ContractKey::of::<I>(),
            lifetime,
            activation: None,
            start_order: DEFAULT_START_ORDER,
            factory,
            lifecycle: None,
            listener: None,
            _contract: PhantomData,
        }
    }

    /// Qualify the contract with a name
    #[must_use]
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.key = ContractKey::named::<I>(name);
        self
    }

    /// Construct during startup
    #[must_use]
    pub fn eager(mut self) -> Self {
        self.activation = Some(Activation::Eager);
        self
    }

    /// Construct on first request
    #[must_use]
    pub fn lazy(mut self) -> Self {
        self.activation = Some(Activation::Lazy);
        self
    }

    /// Position among eager bindings; ties keep registration order
    #[must_use]
    pub fn start_order(mut self, order: i32) -> Self {
        self.start_order = order;
        self
    }

    /// Expose lifecycle hooks of the produced instance
    ///
    /// For a contract whose trait extends [`Component`], `|c| c` is enough.
    #[must_use]
    pub fn with_lifecycle<F>(mut self, view: F) -> Self
    where
        F: Fn(Arc<I>) -> Arc<dyn Component> + Send + Sync + 'static,
    {
        self.lifecycle = Some(Arc::new(view));
        self
    }

    /// Notify the produced instance once the runtime finished starting
    #[must_use]
    pub fn with_start_listener<F>(mut self, view: F) -> Self
    where
        F: Fn(Arc<I>) -> Arc<dyn StartListener> + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(view));
        self
    }

    /// Contract the binding will serve
    pub fn key(&self) -> &ContractKey {
        &self.key
    }

    /// Erase the contract type
    pub fn build(self) -> Binding {
        let has_lifecycle = self.lifecycle.is_some();
        let has_listener = self.listener.is_some();
        let Self {
            key,
            lifetime,
            activation,
            start_order,
            factory,
            lifecycle,
            listener,
            ..
        } = self;

        let erased: ErasedFactory = Arc::new(move |ctx: &ResolutionContext<'_>| {
            let typed = factory(ctx)?;
            Ok(Constructed {
                lifecycle: lifecycle.as_ref().map(|view| view(Arc::clone(&typed))),
                listener: listener.as_ref().map(|view| view(Arc::clone(&typed))),
                instance: erase_instance(typed),
            })
        });

        Binding {
            key,
            lifetime,
            activation,
            start_order,
            sequence: 0,
            group: None,
            has_lifecycle,
            has_listener,
            factory: erased,
        }
    }
}

impl<I: ?Sized + Send + Sync + 'static> From<BindingBuilder<I>> for Binding {
    fn from(builder: BindingBuilder<I>) -> Self {
        builder.build()
    }
}
