use serde_json::{json, Map, Value};

// ============================================================================
// Session Log Fixtures
// ============================================================================

/// Builds raw session log JSON the way the quiz addon writes it
pub struct LogBuilder {
    players: Map<String, Value>,
    main: Vec<Value>,
    money: Vec<Value>,
    map: Vec<Value>,
    share_awards: Vec<Value>,
    solo_attempts: Vec<Value>,
    solo_history: Vec<Value>,
    team_events: Vec<Value>,
    meta: Option<Value>,
    with_players: bool,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self {
            players: Map::new(),
            main: vec![],
            money: vec![],
            map: vec![],
            share_awards: vec![],
            solo_attempts: vec![],
            solo_history: vec![],
            team_events: vec![],
            meta: None,
            with_players: true,
        }
    }

    pub fn with_player(self, key: &str, name: &str, final_score: f64) -> Self {
        self.with_raw_player(key, json!({ "name": name, "finalScore": final_score }))
    }

    pub fn with_raw_player(mut self, key: &str, raw: Value) -> Self {
        self.players.insert(key.to_string(), raw);
        self
    }

    /// Drops the `players` object entirely
    pub fn without_players(mut self) -> Self {
        self.with_players = false;
        self
    }

    pub fn with_main_question(mut self, question: QuestionBuilder) -> Self {
        self.main.push(question.build());
        self
    }

    pub fn with_money_question(mut self, question: QuestionBuilder) -> Self {
        self.money.push(question.build());
        self
    }

    pub fn with_map_question(mut self, question: QuestionBuilder) -> Self {
        self.map.push(question.build());
        self
    }

    pub fn with_share_award(mut self, award: Value) -> Self {
        self.share_awards.push(award);
        self
    }

    pub fn with_solo_attempt(mut self, attempt: Value) -> Self {
        self.solo_attempts.push(attempt);
        self
    }

    pub fn with_solo_history(mut self, attempts: Vec<Value>) -> Self {
        self.solo_history.push(json!({ "attempts": attempts }));
        self
    }

    pub fn with_team_event(mut self, event: Value) -> Self {
        self.team_events.push(event);
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn build(self) -> Value {
        let mut root = Map::new();
        if self.with_players {
            root.insert("players".into(), Value::Object(self.players));
        }
        root.insert("mainGame".into(), json!({ "questions": self.main }));
        root.insert(
            "miniGames".into(),
            json!({
                "money": { "questions": self.money },
                "map": { "questions": self.map },
                "solo": { "attempts": self.solo_attempts, "history": self.solo_history },
                "teamBattle": { "events": self.team_events },
            }),
        );
        root.insert("shares".into(), json!({ "awards": self.share_awards }));
        if let Some(meta) = self.meta {
            root.insert("meta".into(), meta);
        }
        Value::Object(root)
    }

    pub fn build_bytes(self) -> Vec<u8> {
        self.build().to_string().into_bytes()
    }
}

pub struct QuestionBuilder {
    raw: Map<String, Value>,
    answers: Vec<Value>,
}

impl QuestionBuilder {
    pub fn new(qid: &str) -> Self {
        let mut raw = Map::new();
        raw.insert("qid".into(), json!(qid));
        Self {
            raw,
            answers: vec![],
        }
    }

    pub fn correct_key(mut self, key: &str) -> Self {
        self.raw.insert("correctKey".into(), json!(key));
        self
    }

    pub fn revealed_at(mut self, millis: f64) -> Self {
        self.raw.insert("revealedAt".into(), json!(millis));
        self
    }

    pub fn with_answer(mut self, answer: Value) -> Self {
        self.answers.push(answer);
        self
    }

    pub fn build(mut self) -> Value {
        self.raw.insert("answers".into(), Value::Array(self.answers));
        Value::Object(self.raw)
    }
}

/// `{"userId", "key", "sec"}` answer; pass `None` to leave a field out
pub fn answer(user_id: &str, key: Option<&str>, sec: Option<f64>) -> Value {
    let mut raw = Map::new();
    raw.insert("userId".into(), json!(user_id));
    if let Some(key) = key {
        raw.insert("key".into(), json!(key));
    }
    if let Some(sec) = sec {
        raw.insert("sec".into(), json!(sec));
    }
    Value::Object(raw)
}
