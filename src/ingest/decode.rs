use serde_json::{Map, Value};
use tracing::debug;

use super::{
    errors::IngestError,
    fields::{first_present, first_truthy, items, number, number_or_zero, text, timestamp},
    models::{
        Answer, AnswerMarker, LogData, LogMeta, Player, PlayerRoster, Question, ShareAward,
        SoloAttempt, SoloOutcome, TeamEvent,
    },
};

/// Checks the two structural requirements and decodes everything else leniently.
pub fn decode_log(root: &Value) -> Result<LogData, IngestError> {
    let root_object = root.as_object().ok_or(IngestError::NotAnObject)?;

    let players = root_object
        .get("players")
        .and_then(Value::as_object)
        .ok_or(IngestError::MissingPlayers)?;

    let main_questions = root
        .pointer("/mainGame/questions")
        .and_then(Value::as_array)
        .ok_or(IngestError::MissingMainQuestions)?;

    let data = LogData {
        roster: normalize_players(players),
        main: main_questions.iter().map(decode_question).collect(),
        money: decode_questions(root.pointer("/miniGames/money/questions")),
        map: decode_questions(root.pointer("/miniGames/map/questions")),
        share_awards: items(root.pointer("/shares/awards"))
            .iter()
            .map(decode_share_award)
            .collect(),
        solo_attempts: decode_solo_attempts(root.pointer("/miniGames/solo")),
        team_events: items(root.pointer("/miniGames/teamBattle/events"))
            .iter()
            .map(decode_team_event)
            .collect(),
        meta: root.get("meta").and_then(decode_meta),
    };

    debug!(
        players = data.roster.len(),
        main_questions = data.main.len(),
        money_questions = data.money.len(),
        map_questions = data.map.len(),
        share_awards = data.share_awards.len(),
        solo_attempts = data.solo_attempts.len(),
        "Decoded log"
    );

    Ok(data)
}

/// Builds the roster keyed by lower-cased raw key. Later duplicates overwrite.
pub fn normalize_players(raw_players: &Map<String, Value>) -> PlayerRoster {
    let mut roster = PlayerRoster::new();

    for (raw_id, raw) in raw_players {
        let display_name = first_truthy(raw, &["name", "nickname", "displayName"])
            .and_then(text)
            .unwrap_or_else(|| raw_id.clone());

        roster.insert(Player {
            id: raw_id.to_lowercase(),
            display_name,
            avatar_url: first_truthy(raw, &["avatar", "picture"])
                .and_then(text)
                .unwrap_or_default(),
            final_score: number_or_zero(first_truthy(raw, &["finalScore", "score"])),
            last_seen: first_truthy(raw, &["lastSeen", "lastActivity"]).and_then(timestamp),
        });
    }

    roster
}

fn decode_questions(list: Option<&Value>) -> Vec<Question> {
    items(list).iter().map(decode_question).collect()
}

fn decode_question(raw: &Value) -> Question {
    Question {
        qid: first_present(raw, &["qid"]).and_then(text),
        correct_option_key: first_truthy(raw, &["correctKey"]).and_then(text),
        revealed_at: first_truthy(raw, &["revealedAt"])
            .and_then(number)
            .filter(|at| *at != 0.0),
        answers: items(raw.get("answers")).iter().map(decode_answer).collect(),
        first_answer: raw.get("firstAnswer").and_then(decode_marker),
        fastest_correct: raw.get("fastestCorrect").and_then(decode_marker),
    }
}

fn decode_answer(raw: &Value) -> Answer {
    Answer {
        user_id: first_present(raw, &["userId"]).and_then(text),
        option_key: first_present(raw, &["key"]).and_then(text),
        ok: raw.get("ok").and_then(Value::as_bool),
        relative_seconds: raw.get("sec").and_then(number),
    }
}

fn decode_marker(raw: &Value) -> Option<AnswerMarker> {
    let user_id = first_truthy(raw, &["userId"]).and_then(text)?;
    Some(AnswerMarker {
        user_id,
        seconds: raw.get("sec").and_then(number),
    })
}

fn decode_share_award(raw: &Value) -> ShareAward {
    ShareAward {
        user_id: first_present(raw, &["userId"]).and_then(text),
        name: first_present(raw, &["name"]).and_then(text),
        points: number_or_zero(first_present(raw, &["points", "score"])),
        share_count: number_or_zero(first_present(
            raw,
            &["shares", "appliedShares", "rawShares"],
        )),
        timestamp: first_present(raw, &["t", "timestamp", "time"]).and_then(timestamp),
    }
}

/// Live attempts first, then every history batch in order.
fn decode_solo_attempts(solo: Option<&Value>) -> Vec<SoloAttempt> {
    let Some(solo) = solo else {
        return Vec::new();
    };

    let live = items(solo.get("attempts")).iter();
    let history = items(solo.get("history"))
        .iter()
        .flat_map(|batch| items(batch.get("attempts")).iter());

    live.chain(history).map(decode_solo_attempt).collect()
}

fn decode_solo_attempt(raw: &Value) -> SoloAttempt {
    let outcome = match raw.get("ok").and_then(Value::as_bool) {
        Some(true) => SoloOutcome::Won,
        Some(false) => SoloOutcome::Lost,
        None => SoloOutcome::Unknown,
    };

    SoloAttempt {
        user_id: first_present(raw, &["userId"]).and_then(text),
        name: first_present(raw, &["name"]).and_then(text),
        outcome,
        elapsed_seconds: first_present(raw, &["sec", "secsTotal"]).and_then(number),
        timestamp: first_present(raw, &["t", "timestamp", "startedAt"]).and_then(timestamp),
    }
}

fn decode_team_event(raw: &Value) -> TeamEvent {
    let label = first_truthy(raw, &["type"])
        .and_then(text)
        .unwrap_or_else(|| raw.to_string());

    TeamEvent {
        label,
        timestamp: first_truthy(raw, &["t", "timestamp"]).and_then(timestamp),
    }
}

fn decode_meta(raw: &Value) -> Option<LogMeta> {
    raw.as_object()?;
    Some(LogMeta {
        day: first_truthy(raw, &["day", "date"]).and_then(text),
        addon_version: first_truthy(raw, &["addonVersion"]).and_then(text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn players(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn player_ids_are_lower_cased_and_names_resolved() {
        let roster = normalize_players(&players(json!({
            "AnaX": { "name": "Ana" },
            "bob": { "nickname": "Bobby", "score": "12" },
            "Cid": { "displayName": "C" },
            "Dee": {}
        })));

        let ids: Vec<&str> = roster.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["anax", "bob", "cid", "dee"]);
        assert_eq!(roster.get("anax").unwrap().display_name, "Ana");
        assert_eq!(roster.get("bob").unwrap().display_name, "Bobby");
        assert_eq!(roster.get("bob").unwrap().final_score, 12.0);
        assert_eq!(roster.get("cid").unwrap().display_name, "C");
        // raw key, not the lower-cased id
        assert_eq!(roster.get("dee").unwrap().display_name, "Dee");
    }

    #[test]
    fn colliding_ids_keep_last_record() {
        let roster = normalize_players(&players(json!({
            "P1": { "name": "Upper", "finalScore": 1 },
            "p1": { "name": "Lower", "finalScore": 2 }
        })));

        assert_eq!(roster.len(), 1);
        let player = roster.get("p1").unwrap();
        assert_eq!(player.display_name, "Lower");
        assert_eq!(player.final_score, 2.0);
    }

    #[test]
    fn player_defaults_and_alternates() {
        let roster = normalize_players(&players(json!({
            "a": { "picture": "http://img", "finalScore": "n/a", "lastActivity": 500 },
            "b": null
        })));

        let a = roster.get("a").unwrap();
        assert_eq!(a.avatar_url, "http://img");
        assert_eq!(a.final_score, 0.0);
        assert_eq!(a.last_seen, Some(500.0));

        let b = roster.get("b").unwrap();
        assert_eq!(b.display_name, "b");
        assert_eq!(b.avatar_url, "");
        assert_eq!(b.last_seen, None);
    }

    #[test]
    fn rejects_missing_players() {
        let root = json!({ "mainGame": { "questions": [] } });
        assert!(matches!(decode_log(&root), Err(IngestError::MissingPlayers)));
    }

    #[test]
    fn rejects_missing_main_questions() {
        let root = json!({ "players": {}, "mainGame": { "questions": {} } });
        assert!(matches!(
            decode_log(&root),
            Err(IngestError::MissingMainQuestions)
        ));
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(matches!(decode_log(&json!([1, 2])), Err(IngestError::NotAnObject)));
    }

    #[test]
    fn tolerates_malformed_questions_and_answers() {
        let root = json!({
            "players": {},
            "mainGame": { "questions": [
                null,
                { "qid": 7, "answers": "nope" },
                { "qid": "q3", "answers": [null, { "userId": "p1", "sec": "1.5" }] }
            ] }
        });

        let data = decode_log(&root).unwrap();
        assert_eq!(data.main.len(), 3);
        assert!(data.main[0].answers.is_empty());
        assert_eq!(data.main[1].qid.as_deref(), Some("7"));
        assert!(data.main[1].answers.is_empty());
        assert_eq!(data.main[2].answers.len(), 2);
        assert_eq!(data.main[2].answers[0].user_id, None);
        assert_eq!(data.main[2].answers[1].relative_seconds, Some(1.5));
    }

    #[test]
    fn share_awards_use_alternate_fields() {
        let root = json!({
            "players": {},
            "mainGame": { "questions": [] },
            "shares": { "awards": [
                { "userId": "p1", "appliedShares": 2, "score": 40, "timestamp": 99 }
            ] }
        });

        let award = &decode_log(&root).unwrap().share_awards[0];
        assert_eq!(award.share_count, 2.0);
        assert_eq!(award.points, 40.0);
        assert_eq!(award.timestamp, Some(99.0));
    }

    #[test]
    fn solo_attempts_include_history() {
        let root = json!({
            "players": {},
            "mainGame": { "questions": [] },
            "miniGames": { "solo": {
                "attempts": [{ "userId": "p1", "ok": true, "t": 1 }],
                "history": [
                    { "attempts": [{ "userId": "p2", "ok": false, "secsTotal": 4.5, "startedAt": 2 }] },
                    { "attempts": "bad" },
                    { "attempts": [{ "userId": "p3" }] }
                ]
            } }
        });

        let attempts = decode_log(&root).unwrap().solo_attempts;
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0].outcome, SoloOutcome::Won);
        assert_eq!(attempts[1].outcome, SoloOutcome::Lost);
        assert_eq!(attempts[1].elapsed_seconds, Some(4.5));
        assert_eq!(attempts[1].timestamp, Some(2.0));
        assert_eq!(attempts[2].outcome, SoloOutcome::Unknown);
    }

    #[test]
    fn meta_and_team_events() {
        let root = json!({
            "players": {},
            "mainGame": { "questions": [] },
            "miniGames": { "teamBattle": { "events": [
                { "type": "round_start", "t": 10 },
                { "score": 3 }
            ] } },
            "meta": { "date": "2025-11-03", "addonVersion": "1.4.0" }
        });

        let data = decode_log(&root).unwrap();
        assert_eq!(data.team_events[0].label, "round_start");
        assert_eq!(data.team_events[0].timestamp, Some(10.0));
        assert_eq!(data.team_events[1].label, "{\"score\":3}");

        let meta = data.meta.unwrap();
        assert_eq!(meta.day.as_deref(), Some("2025-11-03"));
        assert_eq!(meta.addon_version.as_deref(), Some("1.4.0"));
    }
}
