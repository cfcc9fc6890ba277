// examples/todo.rs
//
// A headless to-do app wired as two long-lived tasks:
//   core:  reads actions from a mailbox, reduces them into state, and writes
//          each new snapshot to a handoff channel;
//   shell: reads snapshots, "renders" them, and sends the next scripted user
//          action back through the mailbox.
//
// Run with: RUST_LOG=fibre_relay=trace cargo run --example todo

use fibre_relay::handoff::{self, Handoff};
use fibre_relay::mailbox::{self, Mailbox, Messages};
use futures_util::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
struct State {
  items: Vec<String>,
}

#[derive(Debug)]
enum Action {
  AddNewItemAtLast(String),
  RemoveAll,
}

#[derive(Debug)]
enum Rendition {
  Snapshot(State),
}

async fn run_core(mut actions: Messages<Action>, renditions: Handoff<Rendition>) {
  let mut state = State::default();
  while let Some(action) = actions.next().await {
    info!(?action, "core received action");
    match action {
      Action::AddNewItemAtLast(text) => state.items.push(text),
      Action::RemoveAll => state.items.clear(),
    }
    // Waits here if the shell has not taken the previous snapshot yet.
    if renditions.write(Rendition::Snapshot(state.clone())).await.is_err() {
      break;
    }
  }
  info!("action mailbox closed; core exiting");
}

async fn run_shell(renditions: Handoff<Rendition>, actions: Mailbox<Action>) {
  let mut script = vec![
    Action::AddNewItemAtLast("new item".to_string()),
    Action::AddNewItemAtLast("new item".to_string()),
    Action::RemoveAll,
    Action::AddNewItemAtLast("new item".to_string()),
  ]
  .into_iter();

  while let Ok(Rendition::Snapshot(state)) = renditions.read().await {
    println!("+---------------------------+");
    for item in &state.items {
      println!("| {:<25} |", item);
    }
    println!("+---------------------------+ ({} items)", state.items.len());

    let Some(next) = script.next() else {
      break;
    };
    if actions.send(next).is_err() {
      break;
    }
  }
  // Dropping `actions` here closes the mailbox and ends the core's loop.
  info!("script finished; shell exiting");
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let actions = mailbox::channel::<Action>();
  let renditions = handoff::channel::<Rendition>();

  // Seed the shell with the initial empty state.
  renditions
    .write(Rendition::Snapshot(State::default()))
    .await
    .expect("fresh channel accepts a write");

  let core = tokio::spawn(run_core(actions.messages(), renditions.clone()));
  let shell = tokio::spawn(run_shell(renditions, actions));

  shell.await.expect("shell task panicked");
  core.await.expect("core task panicked");
}
