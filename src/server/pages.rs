use crate::app::display::{image_src, link_href};
use crate::catalog::Product;

const IMAGE_BASE: &str = "/static/images";

pub struct ShowcaseItem {
    pub id: &'static str,
    pub name: &'static str,
    pub image: &'static str,
}

pub const SHOWCASE: [ShowcaseItem; 8] = [
    ShowcaseItem {
        id: "project1",
        name: "Waiting in Line",
        image: "lorempixel.people.1.jpeg",
    },
    ShowcaseItem {
        id: "project2",
        name: "Needfinding",
        image: "lorempixel.city.1.jpeg",
    },
    ShowcaseItem {
        id: "project3",
        name: "Prototyping",
        image: "lorempixel.technics.1.jpeg",
    },
    ShowcaseItem {
        id: "project4",
        name: "Heuristic Evaluation",
        image: "lorempixel.abstract.1.jpeg",
    },
    ShowcaseItem {
        id: "project5",
        name: "Visualization",
        image: "lorempixel.abstract.8.jpeg",
    },
    ShowcaseItem {
        id: "project6",
        name: "Social design",
        image: "lorempixel.people.2.jpeg",
    },
    ShowcaseItem {
        id: "project7",
        name: "Gestural interaction",
        image: "lorempixel.technics.2.jpeg",
    },
    ShowcaseItem {
        id: "project8",
        name: "Design tools",
        image: "lorempixel.city.2.jpeg",
    },
];

pub fn showcase_page() -> String {
    let items: String = SHOWCASE
        .iter()
        .map(|item| {
            format!(
                "<li id=\"{}\"><img class=\"img-thumbnail\" src=\"{}\" alt=\"{}\">\
                 <span>{}</span></li>\n",
                escape_html(item.id),
                escape_html(&image_src(IMAGE_BASE, item.image)),
                escape_html(item.name),
                escape_html(item.name),
            )
        })
        .collect();

    let heading = escape_html(SHOWCASE[0].name);
    let body = format!("<h1>{heading}</h1>\n<ul class=\"showcase\">\n{items}</ul>");
    layout("Left or Right", &body)
}

pub fn start_page(product: &Product, link_base: &str) -> String {
    let price = product
        .prices
        .as_deref()
        .map(|prices| format!("<p id=\"productPrice\">{}</p>\n", escape_html(prices)))
        .unwrap_or_default();

    let body = format!(
        "<p id=\"productName\">{description}</p>\n\
         <a id=\"productLink\" href=\"{href}\">\
         <img id=\"productImage\" data-product-id=\"{id}\" src=\"{src}\" alt=\"{description}\">\
         </a>\n\
         {price}\
         <p class=\"keys\">Press 1 to dislike, 2 to like.</p>\n\
         <h2>Disliked</h2>\n<div id=\"disliked\"></div>\n\
         <h2>Liked</h2>\n<div id=\"liked\"></div>",
        description = escape_html(&product.description),
        href = escape_html(&link_href(link_base, &product.url)),
        id = product.id,
        src = escape_html(&image_src(IMAGE_BASE, &product.image_file)),
    );

    layout("Left or Right", &body)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n\
         <head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductId;

    #[test]
    fn showcase_lists_all_eight_items() {
        let page = showcase_page();
        assert_eq!(page.matches("<li id=").count(), 8);
        assert!(page.contains("/static/images/lorempixel.city.2.jpeg"));
        assert!(page.contains("Gestural interaction"));
    }

    #[test]
    fn start_page_renders_product_image_link_and_price() {
        let product = Product {
            id: ProductId::new(7).expect("id"),
            description: "Shirt <XL>".to_string(),
            image_file: "shirt.jpg".to_string(),
            url: "p/7".to_string(),
            prices: Some("19.99".to_string()),
        };

        let page = start_page(&product, "http://www.macys.com/");
        assert!(page.contains("src=\"/static/images/shirt.jpg\""));
        assert!(page.contains("href=\"http://www.macys.com/p/7\""));
        assert!(page.contains("Shirt &lt;XL&gt;"));
        assert!(page.contains("19.99"));
        assert!(page.contains("id=\"liked\""));
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(escape_html("a&b<\"'>"), "a&amp;b&lt;&quot;&#39;&gt;");
    }
}
