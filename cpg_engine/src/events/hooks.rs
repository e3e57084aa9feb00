use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, OrderExpiredEvent, OrderFulfilledEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_fulfilled_producer: Vec<EventProducer<OrderFulfilledEvent>>,
    pub order_expired_producer: Vec<EventProducer<OrderExpiredEvent>>,
}

pub struct EventHandlers {
    pub on_order_fulfilled: Option<EventHandler<OrderFulfilledEvent>>,
    pub on_order_expired: Option<EventHandler<OrderExpiredEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_fulfilled = hooks.on_order_fulfilled.map(|f| EventHandler::new(buffer_size, f));
        let on_order_expired = hooks.on_order_expired.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_fulfilled, on_order_expired }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_fulfilled {
            result.order_fulfilled_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_expired {
            result.order_expired_producer.push(handler.subscribe());
        }
        result
    }

    pub fn start_handlers(self) {
        if let Some(handler) = self.on_order_fulfilled {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_expired {
            tokio::spawn(handler.start_handler());
        }
    }
}

type BoxedHook<E> = dyn (Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static;

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_fulfilled: Option<Handler<OrderFulfilledEvent>>,
    pub on_order_expired: Option<Handler<OrderExpiredEvent>>,
}

impl EventHooks {
    pub fn on_order_fulfilled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderFulfilledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        let hook: Arc<BoxedHook<OrderFulfilledEvent>> = Arc::new(f);
        self.on_order_fulfilled = Some(hook);
        self
    }

    pub fn on_order_expired<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderExpiredEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        let hook: Arc<BoxedHook<OrderExpiredEvent>> = Arc::new(f);
        self.on_order_expired = Some(hook);
        self
    }
}
