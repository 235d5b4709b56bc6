//! Poll voting endpoints

use crate::constants::{SAMPLE_POLL_OPTIONS, SAMPLE_POLL_QUESTION};
use crate::flash::{self, FlashMessage};
use crate::middleware::ClientCtx;
use crate::orm::{polls, votes};
use crate::web::redirect;
use actix_web::{error, get, post, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_polls)
        .service(vote_on_poll)
        .service(view_poll_results);
}

#[derive(Template)]
#[template(path = "polls/index.html")]
struct PollsTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
    polls: Vec<polls::Model>,
}

#[derive(Template)]
#[template(path = "polls/results.html")]
struct PollResultsTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
    poll: polls::Model,
    results: PollResults,
}

#[derive(Deserialize)]
pub struct VoteFormData {
    pub csrf_token: String,
    pub poll_id: i32,
    #[serde(default)]
    pub option: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded,
    AlreadyVoted,
}

#[derive(Debug, PartialEq, Eq)]
pub struct OptionTally {
    pub option: String,
    pub count: usize,
    /// Rounded down; 0 when nobody has voted.
    pub percent: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PollResults {
    pub tallies: Vec<OptionTally>,
    pub total: usize,
}

/// Returns every poll, creating the sample poll when there are none.
pub async fn ensure_sample_poll(db: &DatabaseConnection) -> Result<Vec<polls::Model>, DbErr> {
    let existing = polls::Entity::find()
        .order_by_asc(polls::Column::Id)
        .all(db)
        .await?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    let [option1, option2, option3, option4] = SAMPLE_POLL_OPTIONS;
    let sample = polls::ActiveModel {
        question: Set(SAMPLE_POLL_QUESTION.to_owned()),
        option1: Set(option1.to_owned()),
        option2: Set(option2.to_owned()),
        option3: Set(option3.to_owned()),
        option4: Set(option4.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    log::info!("Created sample poll {}", sample.id);

    Ok(vec![sample])
}

async fn has_voted(db: &DatabaseConnection, poll_id: i32, user_id: i32) -> Result<bool, DbErr> {
    Ok(votes::Entity::find()
        .filter(votes::Column::PollId.eq(poll_id))
        .filter(votes::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .is_some())
}

/// Records one vote per user per poll. `option` must be one of the poll's options.
pub async fn cast_vote(
    db: &DatabaseConnection,
    poll: &polls::Model,
    user_id: i32,
    option: &str,
) -> Result<VoteOutcome, DbErr> {
    if has_voted(db, poll.id, user_id).await? {
        return Ok(VoteOutcome::AlreadyVoted);
    }
    insert_vote(db, poll, user_id, option).await
}

/// Inserts the vote row without looking for an earlier one first.
///
/// A rejected insert for a pair that already has a row is reported as
/// [`VoteOutcome::AlreadyVoted`]; any other failure is returned.
pub async fn insert_vote(
    db: &DatabaseConnection,
    poll: &polls::Model,
    user_id: i32,
    option: &str,
) -> Result<VoteOutcome, DbErr> {
    let vote = votes::ActiveModel {
        poll_id: Set(poll.id),
        option_text: Set(option.to_owned()),
        user_id: Set(user_id),
        ..Default::default()
    };

    match votes::Entity::insert(vote).exec(db).await {
        Ok(_) => Ok(VoteOutcome::Recorded),
        Err(e) => {
            // The unique (poll_id, user_id) index rejects a concurrent second vote.
            if has_voted(db, poll.id, user_id).await? {
                log::debug!("insert_vote: poll_id={} user_id={} lost a race", poll.id, user_id);
                Ok(VoteOutcome::AlreadyVoted)
            } else {
                Err(e)
            }
        }
    }
}

/// Counts `votes` per option of `poll`, in option order.
///
/// Votes for other polls or naming an unknown option are ignored. A repeated
/// option string is listed once.
pub fn tally_votes(poll: &polls::Model, votes: &[votes::Model]) -> PollResults {
    let mut tallies: Vec<OptionTally> = Vec::with_capacity(4);
    for option in poll.options() {
        if tallies.iter().all(|t| t.option != option) {
            tallies.push(OptionTally {
                option: option.to_owned(),
                count: 0,
                percent: 0,
            });
        }
    }

    let mut total = 0;
    for vote in votes.iter().filter(|v| v.poll_id == poll.id) {
        if let Some(tally) = tallies.iter_mut().find(|t| t.option == vote.option_text) {
            tally.count += 1;
            total += 1;
        }
    }

    if total > 0 {
        for tally in tallies.iter_mut() {
            tally.percent = tally.count * 100 / total;
        }
    }

    PollResults { tallies, total }
}

async fn get_poll(db: &DatabaseConnection, poll_id: i32) -> Result<polls::Model, Error> {
    polls::Entity::find_by_id(poll_id)
        .one(db)
        .await
        .map_err(|e| {
            log::error!("get_poll: {}", e);
            error::ErrorInternalServerError("Could not look up poll.")
        })?
        .ok_or_else(|| error::ErrorNotFound("Poll not found."))
}

#[get("/polls")]
pub async fn view_polls(
    client: ClientCtx,
    session: actix_session::Session,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;

    let polls = ensure_sample_poll(db.get_ref()).await.map_err(|e| {
        log::error!("view_polls: {}", e);
        error::ErrorInternalServerError("Could not load polls.")
    })?;

    Ok(PollsTemplate {
        client,
        flashes: flash::take(&session),
        polls,
    }
    .to_response())
}

#[post("/polls")]
pub async fn vote_on_poll(
    client: ClientCtx,
    session: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    form: Option<web::Form<VoteFormData>>,
) -> Result<HttpResponse, Error> {
    let user = client.require_login()?;
    let form = form.ok_or_else(|| error::ErrorBadRequest("Error interpreting user input."))?;
    crate::middleware::csrf::validate_csrf_token(&session, &form.csrf_token)?;

    let db = db.get_ref();
    ensure_sample_poll(db).await.map_err(|e| {
        log::error!("vote_on_poll: {}", e);
        error::ErrorInternalServerError("Could not load polls.")
    })?;

    let poll = get_poll(db, form.poll_id).await?;

    if !poll.has_option(&form.option) {
        log::debug!("Rejected vote on poll {} for unknown option", poll.id);
        flash::danger(&session, "Please choose one of the poll's options.");
        return Ok(redirect("/polls"));
    }

    let outcome = cast_vote(db, &poll, user.id, &form.option)
        .await
        .map_err(|e| {
            log::error!("vote_on_poll: cast_vote() {}", e);
            error::ErrorInternalServerError("Could not record vote.")
        })?;

    match outcome {
        VoteOutcome::Recorded => {
            log::info!("Vote recorded: poll_id={} user_id={}", poll.id, user.id);
            flash::success(&session, "Vote recorded!");
        }
        VoteOutcome::AlreadyVoted => flash::warning(&session, "You already voted!"),
    }

    Ok(redirect(&format!("/polls/{}/results", poll.id)))
}

#[get("/polls/{poll_id}/results")]
pub async fn view_poll_results(
    client: ClientCtx,
    session: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;

    let db = db.get_ref();
    let poll = get_poll(db, path.into_inner()).await?;

    let votes = votes::Entity::find()
        .filter(votes::Column::PollId.eq(poll.id))
        .all(db)
        .await
        .map_err(|e| {
            log::error!("view_poll_results: {}", e);
            error::ErrorInternalServerError("Could not load votes.")
        })?;
    let results = tally_votes(&poll, &votes);

    Ok(PollResultsTemplate {
        client,
        flashes: flash::take(&session),
        poll,
        results,
    }
    .to_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::register::{register_user, RegisterOutcome};

    fn poll(options: [&str; 4]) -> polls::Model {
        polls::Model {
            id: 1,
            question: "Q?".to_owned(),
            option1: options[0].to_owned(),
            option2: options[1].to_owned(),
            option3: options[2].to_owned(),
            option4: options[3].to_owned(),
        }
    }

    fn vote(id: i32, poll_id: i32, option: &str) -> votes::Model {
        votes::Model {
            id,
            poll_id,
            option_text: option.to_owned(),
            user_id: id,
        }
    }

    #[test]
    fn test_tally_votes() {
        let poll = poll(["A", "B", "C", "D"]);
        let votes = vec![
            vote(1, 1, "A"),
            vote(2, 1, "C"),
            vote(3, 1, "A"),
            vote(4, 1, "Z"),
            vote(5, 2, "A"),
            vote(6, 1, "B"),
        ];

        let results = tally_votes(&poll, &votes);
        assert_eq!(results.total, 4);
        let counts: Vec<(&str, usize, usize)> = results
            .tallies
            .iter()
            .map(|t| (t.option.as_str(), t.count, t.percent))
            .collect();
        assert_eq!(
            counts,
            vec![("A", 2, 50), ("B", 1, 25), ("C", 1, 25), ("D", 0, 0)]
        );
    }

    #[test]
    fn test_tally_votes_empty_and_duplicate_options() {
        let poll = poll(["Yes", "No", "Yes", "Maybe"]);
        let results = tally_votes(&poll, &[]);
        assert_eq!(results.total, 0);
        assert_eq!(results.tallies.len(), 3);
        assert!(results.tallies.iter().all(|t| t.percent == 0));

        let results = tally_votes(&poll, &[vote(1, 1, "Yes")]);
        assert_eq!(results.total, 1);
        assert_eq!(results.tallies[0].count, 1);
    }

    #[actix_rt::test]
    async fn test_cast_vote_once_per_user() {
        let db = crate::db::init_db("sqlite::memory:").await.unwrap();
        let user_id = match register_user(&db, "Asha", "asha@campus.test", "hash")
            .await
            .unwrap()
        {
            RegisterOutcome::Created(id) => id,
            RegisterOutcome::EmailTaken => unreachable!(),
        };

        let polls = ensure_sample_poll(&db).await.unwrap();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].question, SAMPLE_POLL_QUESTION);
        // A second call does not create another poll.
        assert_eq!(ensure_sample_poll(&db).await.unwrap().len(), 1);

        let poll = &polls[0];
        let first = cast_vote(&db, poll, user_id, SAMPLE_POLL_OPTIONS[0])
            .await
            .unwrap();
        assert_eq!(first, VoteOutcome::Recorded);

        let second = cast_vote(&db, poll, user_id, SAMPLE_POLL_OPTIONS[1])
            .await
            .unwrap();
        assert_eq!(second, VoteOutcome::AlreadyVoted);

        let stored = votes::Entity::find().all(&db).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].option_text, SAMPLE_POLL_OPTIONS[0]);
    }

    #[actix_rt::test]
    async fn test_insert_vote_reports_existing_row_as_already_voted() {
        let db = crate::db::init_db("sqlite::memory:").await.unwrap();
        let user_id = match register_user(&db, "Ravi", "ravi@campus.test", "hash")
            .await
            .unwrap()
        {
            RegisterOutcome::Created(id) => id,
            RegisterOutcome::EmailTaken => unreachable!(),
        };
        let poll = ensure_sample_poll(&db).await.unwrap().remove(0);

        let first = insert_vote(&db, &poll, user_id, SAMPLE_POLL_OPTIONS[2])
            .await
            .unwrap();
        assert_eq!(first, VoteOutcome::Recorded);

        // Same pair again; only the unique index stands in the way.
        let second = insert_vote(&db, &poll, user_id, SAMPLE_POLL_OPTIONS[0])
            .await
            .unwrap();
        assert_eq!(second, VoteOutcome::AlreadyVoted);

        let stored = votes::Entity::find().all(&db).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].option_text, SAMPLE_POLL_OPTIONS[2]);
    }
}
