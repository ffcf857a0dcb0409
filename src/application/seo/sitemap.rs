//! robots.txt and XML sitemap rendering

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::domain::{Category, Product};

/// Static storefront pages listed in `sitemap_pages.xml`, with their
/// change frequency and priority.
pub const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("/", "daily", "1.0"),
    ("/products", "daily", "0.9"),
    ("/categories", "weekly", "0.8"),
    ("/contact", "monthly", "0.5"),
    ("/blog", "weekly", "0.6"),
    ("/showrooms", "monthly", "0.5"),
];

/// Child sitemaps referenced from `sitemap.xml`.
pub const SITEMAP_FILES: &[&str] = &[
    "sitemap_pages.xml",
    "sitemap_products.xml",
    "sitemap_categories.xml",
];

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub fn product_path(id: i32) -> String {
    format!("/product/{}", id)
}

pub fn category_path(id: i32) -> String {
    format!("/category/{}", id)
}

/// Escape the five XML special characters.
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn lastmod(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Renders the SEO documents for one public base URL.
#[derive(Debug, Clone)]
pub struct SitemapBuilder {
    base_url: String,
}

impl SitemapBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn absolute(&self, path: &str) -> String {
        escape_xml(&format!("{}{}", self.base_url, path))
    }

    pub fn robots_txt(&self) -> String {
        format!(
            "User-agent: *\nAllow: /\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
            self.base_url
        )
    }

    pub fn sitemap_index(&self, now: DateTime<Utc>) -> String {
        let mut xml = format!("{}\n<sitemapindex xmlns=\"{}\">\n", XML_HEADER, SITEMAP_NS);
        for file in SITEMAP_FILES {
            let _ = write!(
                xml,
                "  <sitemap>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </sitemap>\n",
                self.absolute(&format!("/{}", file)),
                lastmod(&now)
            );
        }
        xml.push_str("</sitemapindex>\n");
        xml
    }

    pub fn pages(&self, now: DateTime<Utc>) -> String {
        let mut xml = urlset_open();
        for (path, changefreq, priority) in STATIC_PAGES {
            push_url(
                &mut xml,
                &self.absolute(path),
                &lastmod(&now),
                changefreq,
                priority,
            );
        }
        xml.push_str("</urlset>\n");
        xml
    }

    pub fn products(&self, products: &[Product]) -> String {
        let mut xml = urlset_open();
        for product in products {
            push_url(
                &mut xml,
                &self.absolute(&product_path(product.id)),
                &lastmod(&product.updated_at),
                "weekly",
                "0.8",
            );
        }
        xml.push_str("</urlset>\n");
        xml
    }

    pub fn categories(&self, categories: &[Category]) -> String {
        let mut xml = urlset_open();
        for category in categories {
            push_url(
                &mut xml,
                &self.absolute(&category_path(category.id)),
                &lastmod(&category.updated_at),
                "weekly",
                "0.7",
            );
        }
        xml.push_str("</urlset>\n");
        xml
    }
}

fn urlset_open() -> String {
    format!("{}\n<urlset xmlns=\"{}\">\n", XML_HEADER, SITEMAP_NS)
}

fn push_url(xml: &mut String, loc: &str, lastmod: &str, changefreq: &str, priority: &str) {
    let _ = write!(
        xml,
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
        loc, lastmod, changefreq, priority
    );
}
