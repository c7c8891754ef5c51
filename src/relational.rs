//! The relational translation path: intent classification, template
//! selection, and SQL assembly.
//!
//! Classification runs over the stopword-filtered token stream; condition
//! extraction runs over the unfiltered stream (see [`condition`]).

pub(crate) mod condition;

use serde::Serialize;

use self::condition::Condition;
use crate::nlp;

/// The coarse category of question. Exactly one is selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Sales,
    Products,
    Locations,
    Summary,
    TopSelling,
    Unsupported,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Sales => "sales",
            Intent::Products => "products",
            Intent::Locations => "locations",
            Intent::Summary => "summary",
            Intent::TopSelling => "top_selling",
            Intent::Unsupported => "unsupported",
        }
    }
}

/// Keyword rules evaluated in declaration order; the first intersecting
/// rule wins. The top-selling special case is handled before this table.
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::Sales, &["sales", "transactions", "orders", "sold"]),
    (Intent::Products, &["products", "items", "coffee", "drinks", "menu"]),
    (Intent::Locations, &["locations", "stores", "shops", "where"]),
    (Intent::Summary, &["summary", "total", "overview", "performance"]),
];

struct QueryTemplate {
    base: &'static str,
    /// Whether the amount/date condition columns are in scope. Conditions
    /// and ordering are appended only when this holds; the other templates
    /// have no transactions join to reference.
    supports_conditions: bool,
}

const SALES_TEMPLATE: QueryTemplate = QueryTemplate {
    base: "SELECT transactions.transaction_id,\n       \
           transaction_date,\n       \
           product_name,\n       \
           quantity,\n       \
           unit_price,\n       \
           (quantity * unit_price) AS total_amount,\n       \
           location_name\n\
           FROM transactions\n\
           JOIN transaction_details ON transactions.transaction_id = transaction_details.transaction_id\n\
           JOIN products ON transaction_details.product_id = products.product_id\n\
           JOIN locations ON transactions.location_id = locations.location_id",
    supports_conditions: true,
};

const PRODUCTS_TEMPLATE: QueryTemplate = QueryTemplate {
    base: "SELECT * FROM products",
    supports_conditions: false,
};

const LOCATIONS_TEMPLATE: QueryTemplate = QueryTemplate {
    base: "SELECT * FROM locations",
    supports_conditions: false,
};

const SUMMARY_TEMPLATE: QueryTemplate = QueryTemplate {
    base: "SELECT location_name,\n       \
           COUNT(DISTINCT transactions.transaction_id) AS total_transactions,\n       \
           SUM(quantity) AS total_items_sold,\n       \
           SUM(quantity * unit_price) AS total_revenue\n\
           FROM transactions\n\
           JOIN transaction_details ON transactions.transaction_id = transaction_details.transaction_id\n\
           JOIN locations ON transactions.location_id = locations.location_id\n\
           GROUP BY locations.location_id, location_name",
    supports_conditions: false,
};

/// Ranked products span two keyword groups and need a bespoke statement
/// with the left join and the HAVING filter, so the template is complete.
const TOP_SELLING_SQL: &str = "SELECT products.product_id,\n       \
    product_name,\n       \
    category,\n       \
    price,\n       \
    COALESCE(SUM(quantity), 0) AS units_sold\n\
    FROM products\n\
    LEFT JOIN transaction_details ON products.product_id = transaction_details.product_id\n\
    GROUP BY products.product_id, product_name, category, price\n\
    HAVING units_sold > 0\n\
    ORDER BY units_sold DESC\n\
    LIMIT 10;";

pub const GUIDANCE: &str =
    "Please ask about sales, products, locations, or summary information.";

/// Outcome of translating a question on the relational path. An
/// unrecognized intent is answered with guidance, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlTranslation {
    Statement { intent: Intent, sql: String },
    Guidance(&'static str),
}

pub fn classify(tokens: &[String]) -> Intent {
    let has = |word: &str| tokens.iter().any(|t| t == word);
    if (has("top") || has("best")) && (has("selling") || has("products")) {
        return Intent::TopSelling;
    }
    for (intent, keywords) in INTENT_RULES {
        if keywords.iter().any(|&keyword| has(keyword)) {
            return *intent;
        }
    }
    Intent::Unsupported
}

pub fn translate(question: &str) -> SqlTranslation {
    let raw = nlp::tokenize(question);
    let filtered = nlp::strip_stopwords(&raw);
    let intent = classify(&filtered);

    let template = match intent {
        Intent::Unsupported => return SqlTranslation::Guidance(GUIDANCE),
        Intent::TopSelling => {
            return SqlTranslation::Statement {
                intent,
                sql: TOP_SELLING_SQL.to_string(),
            }
        }
        Intent::Sales => &SALES_TEMPLATE,
        Intent::Products => &PRODUCTS_TEMPLATE,
        Intent::Locations => &LOCATIONS_TEMPLATE,
        Intent::Summary => &SUMMARY_TEMPLATE,
    };

    let conditions = if template.supports_conditions {
        condition::extract(&raw)
    } else {
        Vec::new()
    };

    SqlTranslation::Statement {
        intent,
        sql: assemble(intent, template, &conditions, &filtered),
    }
}

fn assemble(
    intent: Intent,
    template: &QueryTemplate,
    conditions: &[Condition],
    tokens: &[String],
) -> String {
    let mut sql = template.base.to_string();

    if !conditions.is_empty() {
        let keyword = if template.base.contains("WHERE") {
            "AND"
        } else {
            "WHERE"
        };
        let rendered: Vec<String> = conditions.iter().map(Condition::to_sql).collect();
        sql.push_str(&format!("\n{keyword} {}", rendered.join(" AND ")));
    }

    if template.supports_conditions {
        let has = |word: &str| tokens.iter().any(|t| t == word);
        let ranked = has("top") || has("best") || has("highest");
        let transactional = has("transactions") || has("sales") || has("orders");
        sql.push_str(if ranked && transactional {
            "\nORDER BY total_amount DESC"
        } else {
            "\nORDER BY transaction_date DESC"
        });
    }

    if intent != Intent::Summary {
        sql.push_str("\nLIMIT 10");
    }

    sql.push(';');
    sql
}
