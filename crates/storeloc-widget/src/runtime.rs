//! Event-driven widget runtime.
//!
//! One task owns all widget state and handles one event at a time: host
//! events, user commands, and completions of the data fetch, map load and
//! notice timer. The fetch and map load run as detached tasks that post
//! their result back; once the runtime has stopped those posts fail and are
//! dropped, so a resolution after teardown never touches state.

use std::sync::Arc;
use std::time::Duration;

use storeloc_core::{LocationId, ViewMode};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};

use crate::client::{DataSource, WidgetPayload};
use crate::entitlement::{NoticeTimer, DEFAULT_NOTICE_DURATION};
use crate::error::{ViewError, WidgetError};
use crate::host::{HostAdapter, HostEvent, MountRequest};
use crate::map::{MapOptions, MapProvider, MapSurface};
use crate::platform::HostPlatform;
use crate::render::Frame;
use crate::resolver::LoadTicket;
use crate::view::ViewPhase;
use crate::widget::{Directive, Widget};

/// Collaborators injected at mount.
pub struct WidgetDeps<D, M> {
    pub source: Arc<D>,
    pub maps: Arc<M>,
    pub notice_duration: Duration,
}

impl<D, M> WidgetDeps<D, M> {
    pub fn new(source: Arc<D>, maps: Arc<M>) -> Self {
        Self {
            source,
            maps,
            notice_duration: DEFAULT_NOTICE_DURATION,
        }
    }

    #[must_use]
    pub fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }
}

#[derive(Debug)]
enum Command {
    Select {
        id: LocationId,
        reply: oneshot::Sender<Result<bool, ViewError>>,
    },
    SwitchView {
        mode: ViewMode,
        reply: oneshot::Sender<Result<(), ViewError>>,
    },
    Search(String),
    DismissNotice,
    Snapshot {
        reply: oneshot::Sender<Frame>,
    },
}

enum Completion<S> {
    Data(LoadTicket, Result<WidgetPayload, WidgetError>),
    Map {
        attempt: u64,
        result: Result<S, WidgetError>,
    },
    NoticeExpired(u64),
}

/// Mount the widget on `host`. Returns `None` if the host was already
/// mounted; the load sequence runs once per host element.
///
/// Must be called from within a tokio runtime.
pub fn mount<D, M>(host: &mut HostAdapter, deps: WidgetDeps<D, M>) -> Option<WidgetHandle>
where
    D: DataSource,
    M: MapProvider,
{
    let MountRequest {
        patch,
        context,
        mut platform,
    } = host.connect()?;

    if let Err(e) = platform.init() {
        tracing::warn!(error = %e, "host platform init failed, continuing unauthenticated");
    }

    let (host_tx, host_rx) = mpsc::unbounded_channel();
    host.subscribe(host_tx);

    let widget: Widget<M::Surface> = Widget::new(&patch, context);
    let (frame_tx, frame_rx) = watch::channel(widget.frame());
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();

    let runtime = Runtime {
        widget,
        deps,
        platform,
        completions: completion_tx,
        notice_timer: NoticeTimer::default(),
        frames: frame_tx,
    };
    let task = tokio::spawn(runtime.run(host_rx, command_rx, completion_rx));

    Some(WidgetHandle {
        commands: command_tx,
        frames: frame_rx,
        task,
    })
}

struct Runtime<D, M: MapProvider> {
    widget: Widget<M::Surface>,
    deps: WidgetDeps<D, M>,
    platform: HostPlatform,
    completions: mpsc::UnboundedSender<Completion<M::Surface>>,
    notice_timer: NoticeTimer,
    frames: watch::Sender<Frame>,
}

impl<D: DataSource, M: MapProvider> Runtime<D, M> {
    async fn run(
        mut self,
        mut host_events: mpsc::UnboundedReceiver<HostEvent>,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion<M::Surface>>,
    ) {
        self.start_data_load();

        loop {
            tokio::select! {
                event = host_events.recv() => match event {
                    Some(HostEvent::LiveUpdate(patch)) => {
                        let directives = self.widget.on_host_patch(&patch);
                        self.apply(directives);
                    }
                    // A dropped host counts as detached.
                    Some(HostEvent::Teardown) | None => {
                        self.shutdown();
                        break;
                    }
                },
                Some(command) = commands.recv() => self.handle_command(command),
                Some(completion) = completions.recv() => self.handle_completion(completion),
            }
            self.publish();
        }
    }

    fn start_data_load(&mut self) {
        let Some(ticket) = self.widget.begin_load() else {
            return;
        };
        let source = Arc::clone(&self.deps.source);
        let platform = self.platform.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = source.fetch_widget_data(&platform).await;
            if completions.send(Completion::Data(ticket, result)).is_err() {
                tracing::debug!("widget gone before data load resolved");
            }
        });
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Select { id, reply } => {
                let _ = reply.send(self.widget.select(&id));
            }
            Command::SwitchView { mode, reply } => {
                let result = self
                    .widget
                    .switch_view(mode)
                    .map(|directives| self.apply(directives));
                let _ = reply.send(result);
            }
            Command::Search(query) => self.widget.set_search(&query),
            Command::DismissNotice => {
                let directives = self.widget.dismiss_notice();
                self.apply(directives);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.widget.frame());
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion<M::Surface>) {
        match completion {
            Completion::Data(ticket, result) => {
                let directives = self.widget.on_data_loaded(ticket, result);
                self.apply(directives);
            }
            Completion::Map { attempt, result } => self.widget.on_map_loaded(attempt, result),
            Completion::NoticeExpired(generation) => self.widget.expire_notice(generation),
        }
    }

    fn apply(&mut self, directives: Vec<Directive>) {
        for directive in directives {
            match directive {
                Directive::LoadMap { attempt, options } => self.load_map(attempt, options),
                Directive::ArmNoticeTimer { generation } => {
                    let completions = self.completions.clone();
                    self.notice_timer.arm(self.deps.notice_duration, async move {
                        let _ = completions.send(Completion::NoticeExpired(generation));
                    });
                }
                Directive::CancelNoticeTimer => self.notice_timer.cancel(),
            }
        }
    }

    fn load_map(&self, attempt: u64, options: MapOptions) {
        tracing::debug!(attempt, zoom = options.zoom.get(), "loading map provider");
        let maps = Arc::clone(&self.deps.maps);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = maps.load(options).await;
            if let Err(mpsc::error::SendError(Completion::Map {
                result: Ok(mut surface),
                ..
            })) = completions.send(Completion::Map { attempt, result })
            {
                tracing::debug!(attempt, "widget gone before map loaded, releasing surface");
                surface.release();
            }
        });
    }

    fn shutdown(&mut self) {
        let directives = self.widget.teardown();
        self.apply(directives);
        self.platform.teardown();
        self.publish();
    }

    fn publish(&self) {
        self.frames.send_replace(self.widget.frame());
    }
}

/// Handle to a mounted widget. Dropping it does not unmount; detach the host
/// element for that.
#[derive(Debug)]
pub struct WidgetHandle {
    commands: mpsc::UnboundedSender<Command>,
    frames: watch::Receiver<Frame>,
    task: JoinHandle<()>,
}

impl WidgetHandle {
    /// Select a location. Resolves to whether the map viewport was focused.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] when the widget rejects the selection or has
    /// been torn down.
    pub async fn select(&self, id: LocationId) -> Result<bool, ViewError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Select { id, reply })
            .map_err(|_| ViewError::Detached)?;
        response.await.map_err(|_| ViewError::Detached)?
    }

    /// # Errors
    ///
    /// Returns [`ViewError`] when the switch is not available or the widget
    /// has been torn down.
    pub async fn switch_view(&self, mode: ViewMode) -> Result<(), ViewError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::SwitchView { mode, reply })
            .map_err(|_| ViewError::Detached)?;
        response.await.map_err(|_| ViewError::Detached)?
    }

    pub fn search(&self, query: impl Into<String>) {
        let _ = self.commands.send(Command::Search(query.into()));
    }

    pub fn dismiss_notice(&self) {
        let _ = self.commands.send(Command::DismissNotice);
    }

    /// The frame after every command sent so far has been handled.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Detached`] once the widget has been torn down.
    pub async fn snapshot(&self) -> Result<Frame, ViewError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .map_err(|_| ViewError::Detached)?;
        response.await.map_err(|_| ViewError::Detached)
    }

    /// A receiver that observes every published frame.
    #[must_use]
    pub fn frames(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }

    #[must_use]
    pub fn current_frame(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Wait until the widget has left `Loading`.
    pub async fn settled(&self) -> Frame {
        self.wait_for(|frame| frame.phase != ViewPhase::Loading)
            .await
    }

    /// Wait for the first frame matching `predicate`, or the last frame if
    /// the runtime stops first.
    pub async fn wait_for(&self, predicate: impl FnMut(&Frame) -> bool) -> Frame {
        let mut frames = self.frames.clone();
        let matched = frames.wait_for(predicate).await.map(|frame| frame.clone());
        matched.unwrap_or_else(|_| frames.borrow().clone())
    }

    /// Wait for the runtime task to finish after teardown.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the runtime task panicked or was aborted.
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}
