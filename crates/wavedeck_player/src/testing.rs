//! 测试用的记录型引擎

use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::Sender;
use wavedeck_engine::{
    AudioEngine, EngineError, EngineEvent, EngineFactory, EventKind, ListenerId, WaveformOptions,
};

struct MockListener {
    engine: usize,
    id: ListenerId,
    kind: EventKind,
    handler: Sender<EngineEvent>,
}

/// 所有 mock 引擎共享的记录
#[derive(Default)]
pub struct MockLog {
    pub created: usize,
    pub destroyed: usize,
    pub live: usize,
    pub max_live: usize,
    /// 按发生顺序记录的调用，如 `create:1`、`un:1:ready`、`destroy:1`
    pub calls: Vec<String>,
    pub play_pause_calls: usize,
    pub volumes: Vec<f32>,
    pub fail_create: bool,
    volume: f32,
    duration: f64,
    current_time: f64,
    listeners: Vec<MockListener>,
}

impl MockLog {
    /// 指定引擎实例剩余的监听者数
    pub fn listener_count(&self, engine: usize) -> usize {
        self.listeners.iter().filter(|l| l.engine == engine).count()
    }
}

pub struct MockEngine {
    id: usize,
    log: Rc<RefCell<MockLog>>,
    next_listener: u64,
    destroyed: bool,
}

impl AudioEngine for MockEngine {
    fn load(&mut self, source: &str) {
        self.log
            .borrow_mut()
            .calls
            .push(format!("load:{}:{}", self.id, source));
    }

    fn play_pause(&mut self) {
        self.log.borrow_mut().play_pause_calls += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        let mut log = self.log.borrow_mut();
        log.volume = volume;
        log.volumes.push(volume);
    }

    fn volume(&self) -> f32 {
        self.log.borrow().volume
    }

    fn duration(&self) -> f64 {
        self.log.borrow().duration
    }

    fn current_time(&self) -> f64 {
        self.log.borrow().current_time
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn on(&mut self, kind: EventKind, handler: Sender<EngineEvent>) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        let mut log = self.log.borrow_mut();
        log.calls.push(format!("on:{}:{}", self.id, kind));
        log.listeners.push(MockListener {
            engine: self.id,
            id,
            kind,
            handler,
        });
        id
    }

    fn un(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let mut log = self.log.borrow_mut();
        log.calls.push(format!("un:{}:{}", self.id, kind));
        let before = log.listeners.len();
        let engine = self.id;
        log.listeners
            .retain(|l| !(l.engine == engine && l.kind == kind && l.id == id));
        log.listeners.len() != before
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let mut log = self.log.borrow_mut();
        log.destroyed += 1;
        log.live -= 1;
        log.calls.push(format!("destroy:{}", self.id));
    }
}

pub struct MockFactory {
    log: Rc<RefCell<MockLog>>,
}

impl EngineFactory for MockFactory {
    type Engine = MockEngine;

    fn create(&mut self, _options: &WaveformOptions) -> Result<MockEngine, EngineError> {
        let mut log = self.log.borrow_mut();
        if log.fail_create {
            return Err(EngineError::UnsupportedSource("mock".to_string()));
        }
        log.created += 1;
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        let id = log.created;
        log.calls.push(format!("create:{}", id));

        Ok(MockEngine {
            id,
            log: self.log.clone(),
            next_listener: 0,
            destroyed: false,
        })
    }
}

/// 测试代码操纵 mock 引擎的句柄
#[derive(Clone)]
pub struct MockHandle {
    log: Rc<RefCell<MockLog>>,
}

impl MockHandle {
    pub fn log(&self) -> std::cell::Ref<'_, MockLog> {
        self.log.borrow()
    }

    pub fn log_mut(&self) -> std::cell::RefMut<'_, MockLog> {
        self.log.borrow_mut()
    }

    /// 以指定引擎实例的名义触发事件
    pub fn emit_from(&self, engine: usize, event: EngineEvent) {
        let log = self.log.borrow();
        let kind = event.kind();
        for listener in log
            .listeners
            .iter()
            .filter(|l| l.engine == engine && l.kind == kind)
        {
            let _ = listener.handler.send(event.clone());
        }
    }

    /// 以最新创建的引擎实例的名义触发事件
    pub fn emit(&self, event: EngineEvent) {
        let engine = self.log.borrow().created;
        self.emit_from(engine, event);
    }

    pub fn ready(&self, duration: f64, volume: f32) {
        {
            let mut log = self.log.borrow_mut();
            log.duration = duration;
            log.volume = volume;
        }
        self.emit(EngineEvent::Ready);
    }

    pub fn time_update(&self, current_time: f64) {
        self.log.borrow_mut().current_time = current_time;
        self.emit(EngineEvent::TimeUpdate);
    }

    pub fn finished(&self) {
        self.emit(EngineEvent::Finished);
    }
}

pub fn mock_factory() -> (MockFactory, MockHandle) {
    let log = Rc::new(RefCell::new(MockLog {
        volume: 1.0,
        ..Default::default()
    }));
    (MockFactory { log: log.clone() }, MockHandle { log })
}
