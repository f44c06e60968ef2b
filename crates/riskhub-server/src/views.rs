//! Server-rendered screens
//!
//! Every screen is a pure function from already-fetched rows to an HTML
//! string. Row actions are plain forms posting back to `/app/...`, which
//! redirect to the screen so it re-renders from fresh state. All
//! interpolated text goes through [`escape`].

use riskhub_core::dashboard::DashboardSummary;
use riskhub_core::master::find_by_id;
use riskhub_core::swot::SwotGroupSummary;
use riskhub_core::{
    KriView, RegisterRow, RencanaStrategisView, RiskLevel, SwotCategory, SwotFactorView, WorkUnit,
};

/// Screens reachable from the navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Risks,
    Swot,
    Kri,
    Plans,
}

impl Screen {
    /// Every screen, in navigation order
    pub const ALL: [Screen; 5] = [
        Self::Dashboard,
        Self::Risks,
        Self::Swot,
        Self::Kri,
        Self::Plans,
    ];

    /// Path segment under `/app`
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Risks => "risks",
            Self::Swot => "swot",
            Self::Kri => "kri",
            Self::Plans => "rencana-strategis",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Risks => "Register Risiko",
            Self::Swot => "Analisis SWOT",
            Self::Kri => "Key Risk Indicator",
            Self::Plans => "Rencana Strategis",
        }
    }
}

/// What every page frame needs to know about the caller
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub user: &'a str,
    pub can_delete: bool,
}

/// Escape text for element content and quoted attribute values
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(screen: Screen, frame: Frame<'_>, body: &str) -> String {
    let nav: String = Screen::ALL
        .iter()
        .map(|s| {
            let class = if *s == screen { " class=\"active\"" } else { "" };
            format!("<a href=\"/app/{}\"{class}>{}</a>", s.slug(), s.title())
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "<!DOCTYPE html>\n<html lang=\"id\">\n<head><meta charset=\"utf-8\"><title>{title} - RiskHub</title></head>\n\
         <body>\n<header><nav>{nav}</nav>\
         <form method=\"post\" action=\"/logout\"><span>{user}</span> <button type=\"submit\">Keluar</button></form></header>\n\
         <main>\n<h1>{title}</h1>\n{body}</main>\n</body>\n</html>\n",
        title = screen.title(),
        user = escape(frame.user),
    )
}

fn delete_form(frame: Frame<'_>, screen: Screen, id: &uuid::Uuid) -> String {
    if !frame.can_delete {
        return String::new();
    }
    format!(
        "<form method=\"post\" action=\"/app/{}/{id}/delete\"><button type=\"submit\">Hapus</button></form>",
        screen.slug()
    )
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| escape(&v.to_string())).unwrap_or_else(|| "-".to_string())
}

fn level_cell(value: Option<u8>, level: Option<RiskLevel>) -> String {
    match (value, level) {
        (Some(v), Some(l)) => format!(
            "<td class=\"level-{}\">{v} ({})</td>",
            format!("{l:?}").to_lowercase(),
            l.label()
        ),
        _ => "<td>-</td>".to_string(),
    }
}

/// Login form, optionally with an error message
#[must_use]
pub fn login(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!("<p class=\"error\">{}</p>\n", escape(e)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html lang=\"id\">\n<head><meta charset=\"utf-8\"><title>Masuk - RiskHub</title></head>\n\
         <body>\n<main>\n<h1>Masuk</h1>\n{error}\
         <form method=\"post\" action=\"/login\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Kata sandi <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Masuk</button>\n</form>\n</main>\n</body>\n</html>\n"
    )
}

/// Dashboard screen
#[must_use]
pub fn dashboard(frame: Frame<'_>, summary: &DashboardSummary) -> String {
    let mut body = format!(
        "<section class=\"totals\">\n<p>Total risiko: <strong>{}</strong></p>\n\
         <p>Monitoring terbuka: <strong>{}</strong>, terlambat: <strong>{}</strong></p>\n\
         <p>Faktor SWOT: <strong>{}</strong></p>\n\
         <p>KRI aman {} / hati-hati {} / kritis {} / belum diukur {}</p>\n</section>\n",
        summary.total_risiko,
        summary.monitoring.open + summary.monitoring.in_progress,
        summary.monitoring.overdue,
        summary.total_faktor_swot,
        summary.kri.aman,
        summary.kri.hati_hati,
        summary.kri.kritis,
        summary.kri.belum_diukur,
    );

    body.push_str("<table class=\"levels\">\n<tr><th>Level</th><th>Inherent</th><th>Residual</th></tr>\n");
    for level in RiskLevel::ALL {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            level.label(),
            summary.inherent.count(level),
            summary.residual.count(level)
        ));
    }
    body.push_str("</table>\n");

    body.push_str("<table class=\"units\">\n<tr><th>Unit kerja</th><th>Jumlah risiko</th></tr>\n");
    for unit in &summary.per_unit_kerja {
        let nama = if unit.nama.is_empty() { "(tanpa unit)" } else { unit.nama.as_str() };
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape(nama),
            unit.jumlah
        ));
    }
    body.push_str("</table>\n");
    layout(Screen::Dashboard, frame, &body)
}

/// Risk register screen
#[must_use]
pub fn risks(frame: Frame<'_>, rows: &[RegisterRow]) -> String {
    let mut body = String::from(
        "<p><a href=\"/api/reports/risk-register/excel\">Unduh Excel</a> \
         <a href=\"/api/reports/risk-register/pdf\">Unduh PDF</a></p>\n",
    );
    if rows.is_empty() {
        body.push_str("<p>Belum ada risiko.</p>\n");
        return layout(Screen::Risks, frame, &body);
    }
    body.push_str(
        "<table class=\"register\">\n<tr><th>Kode</th><th>Sasaran</th><th>Pemilik</th>\
         <th>Unit</th><th>Kategori</th><th>Inherent</th><th>Residual</th><th>Status</th>\
         <th>Review berikutnya</th><th></th></tr>\n",
    );
    for r in rows {
        let review = opt(r.tanggal_review_berikutnya);
        let review = if r.overdue {
            format!("<strong class=\"overdue\">{review}</strong>")
        } else {
            review
        };
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}{}<td>{}</td><td>{review}</td><td>{}</td></tr>\n",
            escape(&r.kode_risiko),
            escape(&r.sasaran),
            escape(&r.pemilik_risiko),
            escape(&r.unit_kerja),
            escape(&r.kategori),
            level_cell(r.inherent_value, r.inherent_level),
            level_cell(r.residual_value, r.residual_level),
            opt(r.status_monitoring.map(|s| s.label())),
            delete_form(frame, Screen::Risks, &r.id),
        ));
    }
    body.push_str("</table>\n");
    layout(Screen::Risks, frame, &body)
}

/// SWOT screen: per-unit summaries, then every factor
#[must_use]
pub fn swot(
    frame: Frame<'_>,
    summaries: &[SwotGroupSummary],
    factors: &[SwotFactorView],
    units: &[WorkUnit],
) -> String {
    let unit_name = |id| {
        find_by_id(units, id, |u: &WorkUnit| u.id)
            .map(|u| escape(&u.name))
            .unwrap_or_else(|| "-".to_string())
    };
    let mut body = String::from(
        "<p><a href=\"/api/reports/swot/excel\">Unduh Excel</a> \
         <a href=\"/api/reports/swot/pdf\">Unduh PDF</a></p>\n",
    );

    for group in summaries {
        body.push_str(&format!(
            "<section class=\"swot-summary\">\n<h2>{} - {}</h2>\n\
             <p>Sumbu X {} / Sumbu Y {}: strategi {} ({})</p>\n<ul>\n",
            unit_name(group.unit_kerja_id),
            group.tahun,
            group.sumbu_x,
            group.sumbu_y,
            group.kuadran.nama,
            group.kuadran.strategi,
        ));
        for c in &group.categories {
            let flag = if c.bobot_complete { "" } else { " <em>(bobot belum 100)</em>" };
            body.push_str(&format!(
                "<li>{}: {} faktor, bobot {}, skor {}{flag}</li>\n",
                c.kategori, c.jumlah_faktor, c.total_bobot, c.total_score
            ));
        }
        body.push_str("</ul>\n</section>\n");
    }

    if factors.is_empty() {
        body.push_str("<p>Belum ada faktor SWOT.</p>\n");
        return layout(Screen::Swot, frame, &body);
    }
    body.push_str(
        "<table class=\"swot\">\n<tr><th>Tahun</th><th>Unit</th><th>Kategori</th>\
         <th>Faktor</th><th>Bobot</th><th>Rank</th><th>Skor</th><th></th></tr>\n",
    );
    for kategori in SwotCategory::ALL {
        for v in factors.iter().filter(|v| v.factor.kategori == kategori) {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                v.factor.tahun,
                unit_name(v.factor.unit_kerja_id),
                kategori,
                escape(&v.factor.objek_analisis),
                v.factor.bobot,
                v.factor.rank,
                v.score,
                delete_form(frame, Screen::Swot, &v.factor.id),
            ));
        }
    }
    body.push_str("</table>\n");
    layout(Screen::Swot, frame, &body)
}

/// Key risk indicator screen
#[must_use]
pub fn kri(frame: Frame<'_>, indicators: &[KriView]) -> String {
    let mut body = String::from(
        "<p><a href=\"/api/reports/kri/excel\">Unduh Excel</a> \
         <a href=\"/api/reports/kri/pdf\">Unduh PDF</a></p>\n",
    );
    if indicators.is_empty() {
        body.push_str("<p>Belum ada indikator.</p>\n");
        return layout(Screen::Kri, frame, &body);
    }
    body.push_str(
        "<table class=\"kri\">\n<tr><th>Kode</th><th>Indikator</th><th>Satuan</th>\
         <th>Batas aman</th><th>Batas hati-hati</th><th>Nilai</th><th>Status</th><th></th></tr>\n",
    );
    for v in indicators {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&v.kri.kode),
            escape(&v.kri.nama_indikator),
            opt(v.kri.satuan.as_deref()),
            v.kri.batas_aman,
            v.kri.batas_hati_hati,
            opt(v.kri.nilai_aktual),
            v.status.label(),
            delete_form(frame, Screen::Kri, &v.kri.id),
        ));
    }
    body.push_str("</table>\n");
    layout(Screen::Kri, frame, &body)
}

/// Strategic plan screen with KPI achievement
#[must_use]
pub fn plans(frame: Frame<'_>, plans: &[RencanaStrategisView]) -> String {
    let mut body = String::new();
    if plans.is_empty() {
        body.push_str("<p>Belum ada rencana strategis.</p>\n");
        return layout(Screen::Plans, frame, &body);
    }
    for v in plans {
        body.push_str(&format!(
            "<section class=\"plan\">\n<h2>{} - {}</h2>\n<p>Periode {} s.d. {}. Target: {}. Rata-rata capaian: {}</p>\n",
            escape(&v.plan.kode),
            escape(&v.plan.nama),
            v.plan.periode_mulai,
            v.plan.periode_selesai,
            opt(v.plan.target.as_deref()),
            opt(v.rata_rata_capaian.map(|c| format!("{c:.1}%"))),
        ));
        if !v.plan.sasaran_strategis.is_empty() {
            body.push_str("<ul>\n");
            for sasaran in &v.plan.sasaran_strategis {
                body.push_str(&format!("<li>{}</li>\n", escape(sasaran)));
            }
            body.push_str("</ul>\n");
        }
        body.push_str("<table class=\"kpi\">\n<tr><th>IKU</th><th>Target</th><th>Realisasi</th><th>Capaian</th></tr>\n");
        for k in &v.kpi {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&k.kpi.nama),
                k.kpi.target,
                opt(k.kpi.realisasi),
                opt(k.capaian_persen.map(|c| format!("{c:.1}%"))),
            ));
        }
        body.push_str("</table>\n");
        body.push_str(&delete_form(frame, Screen::Plans, &v.plan.id));
        body.push_str("</section>\n");
    }
    layout(Screen::Plans, frame, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskhub_core::swot::summarize;
    use riskhub_test_utils::{create_swot_set, create_work_units, ORG_A, UNIT_IGD};

    const FRAME: Frame<'static> = Frame {
        user: "Dr. <Budi>",
        can_delete: true,
    };

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn user_name_is_escaped_in_frame() {
        let html = kri(FRAME, &[]);
        assert!(html.contains("Dr. &lt;Budi&gt;"));
        assert!(!html.contains("<Budi>"));
    }

    #[test]
    fn swot_screen_shows_scores_and_quadrant() {
        let factors = create_swot_set(ORG_A, UNIT_IGD);
        let summaries = summarize(&factors);
        let views: Vec<_> = factors.into_iter().map(|f| f.present()).collect();
        let html = swot(FRAME, &summaries, &views, &create_work_units());
        assert!(html.contains("Instalasi Gawat Darurat - 2025"));
        // 60 x 4
        assert!(html.contains("<td>240</td>"));
        assert!(html.contains("action=\"/app/swot/"));
    }

    #[test]
    fn delete_buttons_hidden_without_permission() {
        let factors = create_swot_set(ORG_A, UNIT_IGD);
        let views: Vec<_> = factors.into_iter().map(|f| f.present()).collect();
        let frame = Frame {
            user: "viewer",
            can_delete: false,
        };
        let html = swot(frame, &[], &views, &create_work_units());
        assert!(!html.contains("Hapus"));
    }
}
