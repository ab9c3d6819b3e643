use std::{
    fmt::Write as _,
    fs::File,
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};

use crate::aggregate::{Aggregation, Publisher, PublisherShare};

const HEADER: [&str; 7] = [
    "Category",
    "Domain",
    "Ad Count",
    "Impression Count",
    "City",
    "Neighborhood",
    "Category Placement",
];

pub fn write_csv(aggregation: &Aggregation, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create report {}", path.display()))?;
    write_report(aggregation, file)?;
    tracing::info!(target: "report", path = %path.display(), "report written");
    Ok(())
}

pub fn write_report<W: Write>(aggregation: &Aggregation, sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(sink);
    writer.write_record(HEADER)?;

    for (publisher, domains) in &aggregation.buckets {
        for (domain, stats) in domains {
            for (idx, placement) in stats.placements.iter().enumerate() {
                let cities = placement.cities.join("-");
                let neighborhoods = placement.neighborhoods.join("-");
                let (ad_count, impressions) = if idx == 0 {
                    (stats.ad_count.to_string(), stats.impression_count.to_string())
                } else {
                    (String::new(), String::new())
                };
                let (label, domain) = if idx == 0 {
                    (publisher.label(), domain.as_str())
                } else {
                    ("", "")
                };
                writer.write_record([
                    label,
                    domain,
                    ad_count.as_str(),
                    impressions.as_str(),
                    cities.as_str(),
                    neighborhoods.as_str(),
                    placement.category.as_str(),
                ])?;
            }
        }
    }

    writer.flush()?;
    let mut sink = writer.into_inner().map_err(|err| err.into_error())?;
    sink.write_all(b"\n")?;

    let mut totals_writer = csv::WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(sink);
    totals_writer.write_record(["Publisher", "Total Ads Count"])?;
    for publisher in Publisher::ALL {
        let ad_count = aggregation
            .totals
            .get(&publisher)
            .map_or(0, |totals| totals.ad_count)
            .to_string();
        totals_writer.write_record([publisher.label(), ad_count.as_str()])?;
    }
    totals_writer.flush()?;
    Ok(())
}

pub fn render_summary(aggregation: &Aggregation) -> String {
    let mut out = String::new();
    for (publisher, domains) in &aggregation.buckets {
        let _ = writeln!(out, "\nCategory: {publisher}");
        for (domain, stats) in domains {
            let _ = writeln!(
                out,
                "{domain}: {} ads, {} impressions",
                stats.ad_count, stats.impression_count
            );
        }
    }

    out.push_str("\nTotal ads per publisher:\n");
    for (publisher, totals) in &aggregation.totals {
        let _ = writeln!(
            out,
            "{publisher}: {} ads, {} impressions",
            totals.ad_count, totals.impression_count
        );
    }

    let shares = aggregation.shares();
    out.push_str("\npercentage of each publisher (ads count):\n");
    push_shares(&mut out, &shares, |s| s.ad_percent);
    out.push_str("\npercentage of each publisher (impression count):\n");
    push_shares(&mut out, &shares, |s| s.impression_percent);
    out
}

fn push_shares(out: &mut String, shares: &[PublisherShare], pick: impl Fn(&PublisherShare) -> f64) {
    for share in shares {
        let _ = writeln!(out, "{}: {:.2}%", share.publisher, pick(share));
    }
}
