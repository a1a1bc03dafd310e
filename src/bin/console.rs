#![cfg(not(tarpaulin_include))]

use bidsheet::brands::BrandKey;
use bidsheet::client::HttpItemsApi;
use bidsheet::config::Settings;
use bidsheet::record::{Assignee, AuctionItem, ROSTER};
use bidsheet::workflow::{ConnectionStatus, EntryForm, Notice, Screen, Tab, Workflow};
use std::io::{self, Write};
use std::time::Instant;

const HELP: &str = "\
commands:
  user <n|name|none>          pick who you are (n = 1..4)
  tab entry|feedback|approval switch mode
  brand <all|lv|hermes|chanel|gucci>
  mine on|off                 entry queue: only my items
  list                        show the current screen
  save <id> <price|-> [notes] finish entry for an item
  ref <n> <url>               reference URL n (1..5) for the next save
  approve <id> <feedback>     representative pass
  reject <id> <feedback>      representative fail
  feedback <id> <text>        save feedback only
  ack <id>                    mark feedback as read
  refresh                     reload from the server
  q                           quit";

fn print_item(item: &AuctionItem) {
    let price = item
        .market_price
        .map_or("-".to_string(), |p| format!("¥{}", p));
    println!(
        "  #{:<4} {:<28} {:<10} market {:<12} {}",
        item.id,
        item.brand_name,
        item.assignee.label(),
        price,
        item.product_url
    );
    if !item.feedback.is_empty() {
        let mark = if item.feedback_confirmed { "read" } else { "new" };
        println!("        feedback ({}): {}", mark, item.feedback);
    }
}

fn parse_user(arg: &str) -> Option<Assignee> {
    if let Ok(n) = arg.parse::<usize>() {
        return ROSTER.get(n.checked_sub(1)?).cloned();
    }
    let user = Assignee::from(arg);
    user.is_rostered().then_some(user)
}

struct View {
    brand: BrandKey,
    mine_only: bool,
    form: EntryForm,
}

fn show(workflow: &Workflow<HttpItemsApi>, view: &View) {
    match workflow.screen() {
        Screen::Loading => println!("loading..."),
        Screen::SelectUser => {
            println!("who are you?");
            for (i, a) in ROSTER.iter().enumerate() {
                println!("  {}. {}", i + 1, a);
            }
        }
        Screen::Tab(Tab::Entry) => {
            let counts: Vec<String> = workflow
                .entry_brand_counts()
                .iter()
                .map(|(b, n)| format!("{} {}", b.label(), n))
                .collect();
            println!(
                "entry: {} pending, {}% done  [{}]",
                workflow.pending_count(),
                workflow.progress_percent(),
                counts.join(" | ")
            );
            for item in workflow.entry_queue(view.mine_only, view.brand) {
                print_item(&item);
            }
        }
        Screen::Tab(Tab::FeedbackReview) => {
            println!("feedback: {} unread", workflow.feedback_count().unwrap_or(0));
            for item in workflow.feedback_history() {
                print_item(&item);
            }
        }
        Screen::Tab(Tab::Approval) => {
            let s = workflow.summary();
            println!(
                "approval: {} waiting (total {}, targets {}, passed {}, undecided {})",
                workflow.approval_count(),
                s.total,
                s.bid_targets,
                s.successes,
                s.undecided
            );
            for item in workflow.approval_queue(view.brand) {
                print_item(&item);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::from_env();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut workflow = Workflow::new(HttpItemsApi::new(&settings.api_url));
    let mut view = View {
        brand: BrandKey::All,
        mine_only: false,
        form: EntryForm::default(),
    };

    runtime.block_on(workflow.refresh());
    let mut start_time = Instant::now();
    let mut show_screen = true;

    loop {
        for notice in workflow.take_notices() {
            match notice {
                Notice::Success(m) => println!("ok: {}", m),
                Notice::Error(m) => println!("error: {}", m),
            }
        }
        if show_screen {
            show(&workflow, &view);
        }

        let status = match workflow.status() {
            ConnectionStatus::Loading => "loading",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Sample => "sample",
        };
        let user = workflow.current_user().map_or("-", |u| u.label());
        print!(
            "[{:.1}] ({} {}) > ",
            start_time.elapsed().as_secs_f64(),
            status,
            user
        );
        io::stdout().flush()?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        start_time = Instant::now();
        show_screen = true;

        let mut parts = command.trim().splitn(3, ' ');
        let verb = parts.next().unwrap_or("");
        let first = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("");

        match verb {
            "" => show_screen = false,
            "q" | "quit" => break,
            "help" => {
                println!("{}", HELP);
                show_screen = false;
            }
            "user" if first == "none" => workflow.clear_current_user(),
            "user" => match parse_user(first) {
                Some(u) => {
                    workflow.set_current_user(u);
                }
                None => println!("unknown user: {}", first),
            },
            "tab" => match first {
                "entry" => workflow.select_tab(Tab::Entry),
                "feedback" => workflow.select_tab(Tab::FeedbackReview),
                "approval" => workflow.select_tab(Tab::Approval),
                other => println!("unknown tab: {}", other),
            },
            "brand" => match BrandKey::parse(first) {
                Some(b) => view.brand = b,
                None => println!("unknown brand: {}", first),
            },
            "mine" => view.mine_only = first == "on",
            "list" => {}
            "ref" => match first.parse::<usize>() {
                Ok(n @ 1..=5) => {
                    view.form.reference_urls[n - 1] = rest.to_string();
                    show_screen = false;
                }
                _ => println!("reference number must be 1..5"),
            },
            "save" => {
                let mut args = rest.splitn(2, ' ');
                let price = args.next().unwrap_or("");
                view.form.market_price = match price {
                    "-" => String::new(),
                    p => p.to_string(),
                };
                view.form.notes = args.next().unwrap_or("").to_string();
                runtime.block_on(workflow.save_entry(first, &view.form));
                view.form = EntryForm::default();
            }
            "approve" => runtime.block_on(workflow.approve(first, rest)),
            "reject" => runtime.block_on(workflow.reject(first, rest)),
            "feedback" => runtime.block_on(workflow.save_feedback(first, rest)),
            "ack" => runtime.block_on(workflow.confirm_feedback(first)),
            "refresh" => runtime.block_on(workflow.refresh()),
            other => {
                println!("unknown command: {} (try help)", other);
                show_screen = false;
            }
        }
    }

    Ok(())
}
