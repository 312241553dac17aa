use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::{Arc, LazyLock},
};

use log::debug;
use parking_lot::RwLock;

use crate::{DataSerializer, Error, Result, register_primitives};

type Entry = Arc<dyn Any + Send + Sync>;

static GLOBAL: LazyLock<SerializerSelector> = LazyLock::new(SerializerSelector::with_primitives);

/// Registry resolving a type to its [`DataSerializer`].
///
/// Entries are keyed by [`TypeId`]. The process-wide instance is reached with
/// [`SerializerSelector::global`]; tests and embedders can build their own with
/// [`SerializerSelector::new`] to stay isolated from it.
#[derive(Default)]
pub struct SerializerSelector {
    serializers: RwLock<HashMap<TypeId, Entry>>,
}

impl SerializerSelector {
    /// Creates an empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selector with the fixed-width numeric serializers registered.
    pub fn with_primitives() -> Self {
        let selector = Self::new();
        register_primitives(&selector);
        selector
    }

    /// Process-wide selector, created with the numeric primitives on first use.
    pub fn global() -> &'static SerializerSelector {
        &GLOBAL
    }

    /// Initializes `serializer` against this selector and stores it for `T`,
    /// replacing any previous entry.
    ///
    /// Dependencies must be registered first: an array serializer needs its
    /// element serializer to be resolvable at this point.
    pub fn register<T, S>(&self, mut serializer: S) -> Result<()>
    where
        T: 'static,
        S: DataSerializer<T> + 'static,
    {
        serializer.initialize(self)?;
        self.insert::<T>(Arc::new(serializer));
        Ok(())
    }

    /// Stores an already initialized serializer.
    pub(crate) fn insert<T: 'static>(&self, serializer: Arc<dyn DataSerializer<T>>) {
        let replaced = self
            .serializers
            .write()
            .insert(TypeId::of::<T>(), Arc::new(serializer))
            .is_some();
        debug!(
            "Registered serializer for {}{}.",
            type_name::<T>(),
            if replaced { " (replaced)" } else { "" }
        );
    }

    /// Returns the serializer registered for `T`, if any.
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn DataSerializer<T>>> {
        self.serializers
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn DataSerializer<T>>>())
            .cloned()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.serializers.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.serializers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SerializerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerSelector")
            .field("len", &self.len())
            .finish()
    }
}

/// Resolves the serializer of a member type through a selector.
pub struct MemberSerializer<T>(PhantomData<T>);

impl<T: 'static> MemberSerializer<T> {
    /// Fails with [`Error::SerializerNotFound`] when `T` has no entry.
    pub fn create(selector: &SerializerSelector) -> Result<Arc<dyn DataSerializer<T>>> {
        selector.get::<T>().ok_or(Error::SerializerNotFound {
            type_name: type_name::<T>(),
        })
    }
}
