use crate::record::{Assignee, AuctionItem};

fn item(id: u32, url: &str, brand: &str, assignee: Assignee) -> AuctionItem {
    AuctionItem {
        id: id.to_string(),
        product_url: url.to_string(),
        brand_name: brand.to_string(),
        check: false,
        bid_target: false,
        assignee,
        market_price: None,
        bid_price: None,
        wholesale_price: None,
        reference_url1: String::new(),
        reference_url2: String::new(),
        reference_url3: String::new(),
        reference_url4: String::new(),
        reference_url5: String::new(),
        notes: String::new(),
        representative_check: false,
        judgment_result: false,
        feedback: String::new(),
        feedback_confirmed: false,
        created_at: "2025-01-06T09:00:00Z".to_string(),
        updated_at: "2025-01-06T09:00:00Z".to_string(),
    }
}

/// Items shown when the sheet cannot be reached.
pub fn sample_items() -> Vec<AuctionItem> {
    let mut entered = item(
        3,
        "https://auction.example.com/lots/10422",
        "HERMES バーキン30",
        Assignee::Ito,
    );
    entered.check = true;
    entered.bid_target = true;
    entered.market_price = Some(1_850_000.0);
    entered.bid_price = Some(1_480_000.0);
    entered.wholesale_price = Some(1_600_000.0);
    entered.reference_url1 = "https://market.example.com/hermes/birkin30".to_string();
    entered.notes = "金具に小傷".to_string();

    let mut judged = item(
        4,
        "https://auction.example.com/lots/10423",
        "CHANEL マトラッセ",
        Assignee::Yoshikawa,
    );
    judged.check = true;
    judged.bid_target = true;
    judged.market_price = Some(420_000.0);
    judged.bid_price = Some(310_000.0);
    judged.reference_url1 = "https://market.example.com/chanel/matelasse".to_string();
    judged.representative_check = true;
    judged.judgment_result = false;
    judged.feedback = "相場の参考URLが古いので再確認してください".to_string();

    let mut skipped = item(
        6,
        "https://auction.example.com/lots/10425",
        "GUCCI GGマーモント",
        Assignee::Oride,
    );
    skipped.check = true;
    skipped.notes = "状態不良のため見送り".to_string();

    vec![
        item(
            2,
            "https://auction.example.com/lots/10421",
            "LOUIS VUITTON モノグラム スピーディ",
            Assignee::Yoshikawa,
        ),
        entered,
        judged,
        item(
            5,
            "https://auction.example.com/lots/10424",
            "ルイヴィトン ダミエ",
            Assignee::Mochizuki,
        ),
        skipped,
    ]
}
