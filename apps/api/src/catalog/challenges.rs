//! The SQL challenges of the data analyst simulation. All of them run against
//! [`SAMPLE_DATASET`](crate::catalog::seed::SAMPLE_DATASET).

use crate::catalog::schema::{ColumnSchema, Difficulty, SqlChallenge, TableSchema, TestCase};
use crate::grading::{CompareOp, OrderingRequirement, RowCondition, SemanticRule};

fn employees_table() -> TableSchema {
    TableSchema::new(
        "employees",
        vec![
            ColumnSchema::new("employee_id", "INTEGER").primary_key(),
            ColumnSchema::new("first_name", "TEXT"),
            ColumnSchema::new("last_name", "TEXT"),
            ColumnSchema::new("department", "TEXT"),
            ColumnSchema::new("salary", "INTEGER"),
            ColumnSchema::new("hire_date", "DATE"),
            ColumnSchema::new("email", "TEXT"),
        ],
    )
}

fn products_table() -> TableSchema {
    TableSchema::new(
        "products",
        vec![
            ColumnSchema::new("product_id", "INTEGER").primary_key(),
            ColumnSchema::new("product_name", "TEXT"),
            ColumnSchema::new("category", "TEXT"),
            ColumnSchema::new("price", "DECIMAL"),
        ],
    )
}

fn customers_table() -> TableSchema {
    TableSchema::new(
        "customers",
        vec![
            ColumnSchema::new("customer_id", "INTEGER").primary_key(),
            ColumnSchema::new("customer_name", "TEXT"),
            ColumnSchema::new("email", "TEXT"),
        ],
    )
}

/// `orders` as seen from the product side (challenges 2, 4, 5).
fn product_orders_table() -> TableSchema {
    TableSchema::new(
        "orders",
        vec![
            ColumnSchema::new("order_id", "INTEGER").primary_key(),
            ColumnSchema::new("product_id", "INTEGER")
                .references("products", "product_id"),
            ColumnSchema::new("quantity", "INTEGER"),
            ColumnSchema::new("order_date", "DATE"),
        ],
    )
}

/// `orders` as seen from the customer side (challenge 3).
fn customer_orders_table() -> TableSchema {
    TableSchema::new(
        "orders",
        vec![
            ColumnSchema::new("order_id", "INTEGER").primary_key(),
            ColumnSchema::new("customer_id", "INTEGER")
                .references("customers", "customer_id"),
            ColumnSchema::new("order_date", "DATE"),
            ColumnSchema::new("total_amount", "DECIMAL"),
        ],
    )
}

pub fn sql_challenges() -> Vec<SqlChallenge> {
    vec![
        SqlChallenge {
            id: "challenge-1".to_string(),
            title: "Employee Salary Analysis".to_string(),
            description: "Find all employees in the Engineering department who earn more than \
                          $100,000 and were hired after 2021"
                .to_string(),
            difficulty: Difficulty::Beginner,
            hint: Some(
                "Use WHERE clause with multiple conditions: department = 'Engineering', \
                 salary > 100000, and hire_date > '2021-12-31'"
                    .to_string(),
            ),
            test_cases: vec![TestCase::new(
                "test-1",
                "Should return employees from Engineering with salary > 100000 hired after 2021",
            )
            .columns(&[
                "employee_id",
                "first_name",
                "last_name",
                "department",
                "salary",
                "hire_date",
            ])
            .semantic(SemanticRule::AllOf(vec![
                SemanticRule::every_row(
                    vec![
                        RowCondition::new("department", CompareOp::Eq, "Engineering"),
                        RowCondition::new("salary", CompareOp::Gt, 100_000_i64),
                        RowCondition::new("hire_date", CompareOp::Gt, "2021-12-31"),
                    ],
                    "All results must be Engineering employees with salary > $100,000 hired after 2021.",
                ),
                SemanticRule::key_set(
                    "employee_id",
                    [1_i64, 2, 4, 9],
                    "Your query should return exactly 4 employees: John Doe, Jane Smith, \
                     Alice Williams, and Grace Anderson. Check your WHERE conditions.",
                ),
            ]))],
            tables: vec![employees_table()],
        },
        SqlChallenge {
            id: "challenge-2".to_string(),
            title: "Product Category Performance".to_string(),
            description: "Calculate the total revenue and average price for each product \
                          category, ordered by total revenue descending"
                .to_string(),
            difficulty: Difficulty::Intermediate,
            hint: Some(
                "Use GROUP BY with aggregate functions (SUM, AVG) and ORDER BY to sort results"
                    .to_string(),
            ),
            test_cases: vec![TestCase::new(
                "test-2",
                "Should return category-wise revenue and average price, sorted by revenue",
            )
            .columns(&["category", "total_revenue", "avg_price"])
            .ordered(OrderingRequirement::descending("total_revenue"))
            .semantic(SemanticRule::distinct_at_least(
                "category",
                3,
                "Your query should return results for all product categories \
                 (Electronics, Furniture, Stationery).",
            ))],
            tables: vec![products_table(), product_orders_table()],
        },
        SqlChallenge {
            id: "challenge-3".to_string(),
            title: "Customer Purchase Patterns".to_string(),
            description: "Find customers who made purchases in both January and December 2023, \
                          along with their total spending in each month"
                .to_string(),
            difficulty: Difficulty::Advanced,
            hint: Some(
                "Use subqueries or self-joins to find customers with orders in both months, \
                 then aggregate their spending"
                    .to_string(),
            ),
            test_cases: vec![TestCase::new(
                "test-3",
                "Should return customers with orders in both January and December 2023",
            )
            .columns(&["customer_id", "customer_name", "jan_spending", "dec_spending"])
            .semantic(SemanticRule::key_set(
                "customer_id",
                [1_i64, 2, 5],
                "Only customers with orders in both January and December 2023 qualify.",
            ))],
            tables: vec![customers_table(), customer_orders_table()],
        },
        SqlChallenge {
            id: "challenge-4".to_string(),
            title: "Top Performing Products".to_string(),
            description: "Find the top 3 products by total quantity sold, including their \
                          category and average order value"
                .to_string(),
            difficulty: Difficulty::Intermediate,
            hint: Some(
                "Use JOIN to combine products and orders, then GROUP BY and ORDER BY with LIMIT"
                    .to_string(),
            ),
            test_cases: vec![TestCase::new("test-4", "Should return top 3 products by quantity sold")
                .columns(&["product_name", "category", "total_quantity", "avg_order_value"])
                .rows(3)
                .ordered(OrderingRequirement::descending("total_quantity"))],
            tables: vec![products_table(), product_orders_table()],
        },
        SqlChallenge {
            id: "challenge-5".to_string(),
            title: "Monthly Sales Trend Analysis".to_string(),
            description: "Calculate the month-over-month growth rate in total sales for 2023, \
                          showing month, total sales, and growth percentage"
                .to_string(),
            difficulty: Difficulty::Expert,
            hint: Some(
                "Use window functions (LAG) to compare current month with previous month, \
                 then calculate percentage change"
                    .to_string(),
            ),
            test_cases: vec![TestCase::new("test-5", "Should return monthly sales with growth rate")
                .columns(&["month", "total_sales", "growth_rate"])
                .ordered(OrderingRequirement::ascending("month"))],
            tables: vec![product_orders_table(), products_table()],
        },
    ]
}
