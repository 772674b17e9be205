use oracles_core::{ChatClient, ChatError, ChatResponse, Session};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

pub type PendingReply = JoinHandle<Result<ChatResponse, ChatError>>;

pub struct App {
    pub should_quit: bool,
    pub session: Session,
    pub client: ChatClient,

    // Draft editing
    pub cursor: usize, // char index into the draft

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, set during render
    pub chat_lines: u16,  // wrapped height of the thread, set during render
    scroll_anchor: (usize, bool),

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // In-flight request, at most one
    pub pending: Option<PendingReply>,
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        Self {
            should_quit: false,
            session: Session::new(),
            client,
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_lines: 0,
            scroll_anchor: (0, false),
            animation_frame: 0,
            pending: None,
        }
    }

    /// Start a turn from the current draft and spawn its request. Does
    /// nothing for a blank draft or while a request is outstanding.
    pub fn submit(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let Some(query) = self.session.begin_submit() else {
            return false;
        };
        self.cursor = 0;

        let client = self.client.clone();
        self.pending = Some(tokio::spawn(async move { client.send(&query).await }));
        true
    }

    /// Apply the outcome of the in-flight request. Always clears the
    /// loading flag, including when the task itself failed.
    pub fn settle(&mut self, outcome: Result<Result<ChatResponse, ChatError>, JoinError>) {
        self.pending = None;
        match outcome {
            Ok(result) => self.session.settle(result),
            Err(join_err) => {
                error!(error = %join_err, "chat request task failed");
                self.session.settle_error(&ChatError::Task(join_err.to_string()));
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Snap to the newest content when the turn list or loading flag has
    /// changed since the last call.
    pub fn follow_latest(&mut self) {
        let anchor = (self.session.turns().len(), self.session.is_loading());
        if anchor != self.scroll_anchor {
            self.scroll_anchor = anchor;
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
        debug!(scroll = self.chat_scroll, "chat scrolled to bottom");
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }

    fn max_scroll(&self) -> u16 {
        self.chat_lines.saturating_sub(self.visible_height())
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }
}
