//! Components shared by the unit tests

use std::sync::Arc;

use crate::{
    binding::{Export, Fill, Import, Slot},
    component::Component,
    resolver::{Assembled, Constructor},
    types::Instance,
};

/// Pairs `value` with its descriptor as if it had been constructed
pub fn assemble<T: Component>(value: T) -> Assembled {
    Assembled {
        descriptor: T::descriptor(),
        instance: Instance::from_arc(Arc::new(value)),
    }
}

#[derive(Debug, Default)]
pub struct Logger;
impl Component for Logger {
    fn constructor() -> Constructor<Self> {
        Constructor::default()
    }
}

#[derive(Debug)]
pub struct Service {
    pub logger: Arc<Logger>,
}
impl Component for Service {
    fn constructor() -> Constructor<Self> {
        Constructor::new(|args| {
            Ok(Service {
                logger: args.next()?,
            })
        })
        .param::<Logger>("logger")
    }
}

/// Second dependent of [Logger], for builds attached to an existing context
#[derive(Debug)]
pub struct Counter {
    pub logger: Arc<Logger>,
}
impl Component for Counter {
    fn constructor() -> Constructor<Self> {
        Constructor::new(|args| {
            Ok(Counter {
                logger: args.next()?,
            })
        })
        .param::<Logger>("logger")
    }
}

#[derive(Debug)]
pub struct Cache {
    pub label: String,
}
impl Cache {
    pub fn new(label: &str) -> Self {
        Cache {
            label: label.to_string(),
        }
    }
}
impl Component for Cache {
    fn constructor() -> Constructor<Self> {
        Constructor::from_fn(|| Cache::new("component"))
    }
}

#[derive(Debug)]
pub struct CacheUser {
    pub cache: Arc<Cache>,
}
impl Component for CacheUser {
    fn constructor() -> Constructor<Self> {
        Constructor::new(|args| {
            Ok(CacheUser {
                cache: args.next()?,
            })
        })
        .param::<Cache>("cache")
    }
}

pub struct CycleA {
    pub b: Arc<CycleB>,
}
impl Component for CycleA {
    fn constructor() -> Constructor<Self> {
        Constructor::new(|args| Ok(CycleA { b: args.next()? })).param::<CycleB>("b")
    }
}

pub struct CycleB {
    pub a: Arc<CycleA>,
}
impl Component for CycleB {
    fn constructor() -> Constructor<Self> {
        Constructor::new(|args| Ok(CycleB { a: args.next()? })).param::<CycleA>("a")
    }
}

#[derive(Debug)]
pub struct Config {
    pub timeout: u64,
}
impl Component for Config {
    fn constructor() -> Constructor<Self> {
        Constructor::from_fn(|| Config { timeout: 30 })
    }

    fn exports() -> Vec<Export<Self>> {
        vec![Export::field("timeout", |config: &Config| config.timeout)]
    }
}

#[derive(Debug, Default)]
pub struct Worker {
    pub config: Slot<Config>,
    pub timeout: Slot<u64>,
}
impl Component for Worker {
    fn constructor() -> Constructor<Self> {
        Constructor::default()
    }

    fn imports() -> Vec<Import<Self>> {
        vec![Import::field("config", |worker: &Worker| &worker.config)]
    }

    fn fills() -> Vec<Fill<Self>> {
        vec![Fill::field("timeout", |worker: &Worker| &worker.timeout)]
    }
}
