//! Server-rendered HTML pages.

use spm_core::DashboardSummary;
use std::fmt::Write;

pub(crate) const REGISTRATION_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Patient Registration</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, sans-serif; max-width: 32rem; margin: 2rem auto; }
        label { display: block; margin-top: 0.75rem; }
        input, select { width: 100%; padding: 0.4rem; }
        button { margin-top: 1rem; padding: 0.5rem 1rem; }
    </style>
</head>
<body>
    <h1>Register Patient</h1>
    <form action="/register" method="post">
        <label>Name <input name="name" type="text"></label>
        <label>Aadhaar <input name="aadhaar" type="text"></label>
        <label>Age <input name="age" type="text"></label>
        <label>Gender
            <select name="gender">
                <option value="Male">Male</option>
                <option value="Female">Female</option>
                <option value="Other">Other</option>
            </select>
        </label>
        <label>Status
            <select name="status">
                <option value="inpatient">Inpatient</option>
                <option value="outpatient">Outpatient</option>
            </select>
        </label>
        <label>Ward <input name="ward" type="text"></label>
        <button type="submit">Register</button>
    </form>
    <p><a href="/dashboard">Dashboard</a></p>
</body>
</html>
"#;

const DASHBOARD_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Patient Dashboard</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, sans-serif; max-width: 40rem; margin: 2rem auto; }
        .stats { display: flex; gap: 1rem; }
        .stat { flex: 1; padding: 1rem; border: 1px solid #cbd5e1; border-radius: 6px; }
        .stat .value { font-size: 2rem; font-weight: 600; }
        table { width: 100%; border-collapse: collapse; margin-top: 1.5rem; }
        th, td { text-align: left; padding: 0.4rem; border-bottom: 1px solid #e2e8f0; }
    </style>
</head>
<body>
    <h1>Patient Dashboard</h1>
"#;

pub(crate) fn dashboard_page(summary: &DashboardSummary) -> String {
    let mut html = String::from(DASHBOARD_HEAD);

    html.push_str("    <div class=\"stats\">\n");
    for (label, value) in [
        ("Total patients", summary.total),
        ("Inpatients", summary.inpatients),
        ("Outpatients", summary.outpatients),
    ] {
        // Writing to a String cannot fail.
        let _ = writeln!(
            html,
            "        <div class=\"stat\"><div>{}</div><div class=\"value\">{}</div></div>",
            label, value
        );
    }
    html.push_str("    </div>\n");

    html.push_str("    <table>\n        <tr><th>Ward</th><th>Patients</th></tr>\n");
    for (ward, count) in summary.ward_counts.iter() {
        let _ = writeln!(
            html,
            "        <tr><td>{}</td><td>{}</td></tr>",
            escape_html(ward),
            count
        );
    }
    html.push_str("    </table>\n");

    html.push_str("    <p><a href=\"/\">Register a patient</a></p>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
